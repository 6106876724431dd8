//! Palette construction from a direct-color bitmap.

use tracing::debug;

use super::{LeafSummary, OctreeColorTree};
use crate::bitmap::{Bitmap, PixelFormat};
use crate::bits::IndexDepth;
use crate::error::QuantizeError;
use crate::palette::Palette;

/// Builds a palette of at most `max_colors` entries for an image.
pub trait PaletteQuantizer {
    /// Build a palette sized for `bits` per pixel.
    ///
    /// # Errors
    ///
    /// - [`QuantizeError::UnsupportedDepth`] if `bits` is not 1, 4 or 8
    /// - [`QuantizeError::PaletteSizeExceeded`] if `max_colors` is 0 or larger
    ///   than `2^bits`
    /// - [`QuantizeError::UnsupportedPixelFormat`] if `image` is indexed
    fn create_palette(
        &self,
        image: &Bitmap,
        max_colors: usize,
        bits: u16,
    ) -> Result<Palette, QuantizeError>;
}

/// Octree-based [`PaletteQuantizer`].
///
/// Samples are fed in row-major order and the tree is reduced as soon as it
/// holds more than `max_colors` leaves, so memory stays bounded by the
/// palette size rather than the number of distinct colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct OctreeQuantizer;

impl PaletteQuantizer for OctreeQuantizer {
    fn create_palette(
        &self,
        image: &Bitmap,
        max_colors: usize,
        bits: u16,
    ) -> Result<Palette, QuantizeError> {
        let depth = IndexDepth::from_bits(bits).ok_or(QuantizeError::UnsupportedDepth { bits })?;
        let limit = depth.max_colors();
        if max_colors == 0 || max_colors > limit {
            return Err(QuantizeError::PaletteSizeExceeded {
                requested: max_colors,
                limit,
            });
        }
        match image.format() {
            PixelFormat::Rgb555 | PixelFormat::Bgr24 | PixelFormat::Bgra32 => {}
            other => {
                return Err(QuantizeError::UnsupportedPixelFormat {
                    bits: other.bits_per_pixel(),
                })
            }
        }

        let mut tree = OctreeColorTree::new(depth);
        let mut reductions = 0usize;
        for y in 0..image.height() {
            for x in 0..image.width() {
                tree.add_color(image.pixel(x, y));
                while tree.leaf_count() > max_colors && tree.reduce() {
                    reductions += 1;
                }
            }
        }

        let colors = tree.leaves().iter().map(LeafSummary::average).collect();
        let palette = Palette::new(colors, depth)?;
        debug!(
            bits,
            max_colors,
            used = palette.used(),
            reductions,
            "built octree palette"
        );
        Ok(palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    fn gradient(width: u32, height: u32) -> Bitmap {
        let rgba: Vec<u8> = (0..width * height)
            .flat_map(|i| {
                let v = (i * 255 / (width * height - 1)) as u8;
                [v, 255 - v, v / 3, 255]
            })
            .collect();
        Bitmap::from_rgba(width, height, &rgba).unwrap()
    }

    #[test]
    fn test_palette_is_padded_to_depth() {
        let palette = OctreeQuantizer
            .create_palette(&gradient(8, 8), 16, 4)
            .unwrap();
        assert_eq!(palette.len(), 16);
        assert!(palette.used() <= 16);
    }

    #[test]
    fn test_rejects_bad_depth() {
        let err = OctreeQuantizer
            .create_palette(&gradient(2, 2), 2, 2)
            .unwrap_err();
        assert_eq!(err, QuantizeError::UnsupportedDepth { bits: 2 });
    }

    #[test]
    fn test_rejects_oversized_and_empty_palettes() {
        let image = gradient(2, 2);
        assert_eq!(
            OctreeQuantizer.create_palette(&image, 17, 4).unwrap_err(),
            QuantizeError::PaletteSizeExceeded {
                requested: 17,
                limit: 16
            }
        );
        assert_eq!(
            OctreeQuantizer.create_palette(&image, 0, 8).unwrap_err(),
            QuantizeError::PaletteSizeExceeded {
                requested: 0,
                limit: 256
            }
        );
    }

    #[test]
    fn test_rejects_indexed_source() {
        let image = Bitmap::new(2, 2, PixelFormat::Indexed8);
        assert_eq!(
            OctreeQuantizer.create_palette(&image, 16, 8).unwrap_err(),
            QuantizeError::UnsupportedPixelFormat { bits: 8 }
        );
    }

    #[test]
    fn test_few_colors_survive_exactly() {
        let rgba = [
            255, 0, 0, 255, //
            0, 0, 255, 255, //
            255, 0, 0, 255, //
            0, 0, 255, 255,
        ];
        let image = Bitmap::from_rgba(2, 2, &rgba).unwrap();
        let palette = OctreeQuantizer.create_palette(&image, 256, 8).unwrap();
        assert_eq!(palette.used(), 2);
        assert_eq!(palette.get(0), Some(Rgb::new(0, 0, 255)));
        assert_eq!(palette.get(1), Some(Rgb::new(255, 0, 0)));
    }
}
