//! Fixed-capacity indexed palette.

use crate::bits::IndexDepth;
use crate::color::Rgb;
use crate::error::QuantizeError;

/// An ordered, index-addressed palette holding exactly `2^bits` entries.
///
/// Entries past [`Palette::used`] are black padding. They still take part in
/// nearest-color search, as they would in a decoder that reads the full table.
///
/// # Example
///
/// ```
/// use octree_quant::{IndexDepth, Palette, Rgb};
///
/// let palette = Palette::new(vec![Rgb::new(255, 0, 0)], IndexDepth::Four).unwrap();
/// assert_eq!(palette.len(), 16);
/// assert_eq!(palette.used(), 1);
/// assert_eq!(palette.find_nearest(Rgb::new(200, 10, 10)), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
    used: usize,
    depth: IndexDepth,
}

impl Palette {
    /// Create a palette, zero-filling it to the depth's capacity.
    ///
    /// # Errors
    ///
    /// [`QuantizeError::PaletteSizeExceeded`] if `colors` holds more than
    /// `2^bits` entries.
    pub fn new(mut colors: Vec<Rgb>, depth: IndexDepth) -> Result<Self, QuantizeError> {
        let limit = depth.max_colors();
        if colors.len() > limit {
            return Err(QuantizeError::PaletteSizeExceeded {
                requested: colors.len(),
                limit,
            });
        }
        let used = colors.len();
        colors.resize(limit, Rgb::BLACK);
        Ok(Self {
            colors,
            used,
            depth,
        })
    }

    /// The fixed two-entry palette used for monochrome targets.
    pub fn black_and_white() -> Self {
        Self {
            colors: vec![Rgb::BLACK, Rgb::WHITE],
            used: 2,
            depth: IndexDepth::One,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of entries produced by palette construction (before padding).
    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn depth(&self) -> IndexDepth {
        self.depth
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.colors.get(index).copied()
    }

    #[inline]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn into_colors(self) -> Vec<Rgb> {
        self.colors
    }

    /// Index of the entry closest to `rgb` by squared Euclidean distance.
    ///
    /// Ties keep the lowest index.
    pub fn find_nearest(&self, rgb: Rgb) -> u8 {
        let mut best = 0usize;
        let mut best_distance = u32::MAX;
        for (index, color) in self.colors.iter().enumerate() {
            let distance = rgb.distance_sq(*color);
            if distance < best_distance {
                best_distance = distance;
                best = index;
                if distance == 0 {
                    break;
                }
            }
        }
        best as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_and_white() {
        let palette = Palette::black_and_white();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.find_nearest(Rgb::new(100, 100, 100)), 0);
        assert_eq!(palette.find_nearest(Rgb::new(160, 160, 160)), 1);
    }

    #[test]
    fn test_ties_keep_lowest_index() {
        let palette = Palette::new(
            vec![Rgb::new(0, 0, 10), Rgb::new(0, 0, 30), Rgb::new(0, 0, 10)],
            IndexDepth::Four,
        )
        .unwrap();
        assert_eq!(palette.find_nearest(Rgb::new(0, 0, 20)), 0);
        assert_eq!(palette.find_nearest(Rgb::new(0, 0, 10)), 0);
    }

    #[test]
    fn test_padding_is_black() {
        let palette = Palette::new(vec![Rgb::WHITE], IndexDepth::Four).unwrap();
        assert_eq!(palette.get(15), Some(Rgb::BLACK));
        assert_eq!(palette.find_nearest(Rgb::new(5, 5, 5)), 1);
    }

    #[test]
    fn test_rejects_too_many_colors() {
        let err = Palette::new(vec![Rgb::BLACK; 3], IndexDepth::One).unwrap_err();
        assert_eq!(
            err,
            QuantizeError::PaletteSizeExceeded {
                requested: 3,
                limit: 2
            }
        );
    }
}
