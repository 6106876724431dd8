//! Direct-color to indexed conversion.

use std::time::Instant;

use tracing::debug;

use crate::bitmap::{Bitmap, PixelFormat};
use crate::dither::{Ditherer, FloydSteinberg};
use crate::error::QuantizeError;
use crate::octree::{OctreeQuantizer, PaletteQuantizer};
use crate::palette::{ColorCache, NearestColorMapper, Palette};

/// Converts 16, 24 and 32 bpp bitmaps to 1, 4 or 8 bpp.
///
/// 1 bpp targets use the fixed black and white palette; 4 and 8 bpp targets
/// get an adaptive palette from the configured [`PaletteQuantizer`]. Pixels
/// are mapped in row-major order with the optional [`Ditherer`] spreading
/// each pixel's error before its neighbors are mapped.
///
/// A quantizer holds no per-conversion state, so one instance can serve
/// several threads at once.
///
/// # Example
///
/// ```
/// use octree_quant::{Bitmap, EuclideanQuantizer, PixelFormat};
///
/// let source = Bitmap::from_rgba(2, 1, &[0, 0, 0, 255, 255, 255, 255, 255]).unwrap();
/// let indexed = EuclideanQuantizer::new()
///     .convert(&source, PixelFormat::Indexed1)
///     .unwrap();
/// assert_eq!(indexed.index(0, 0), Some(0));
/// assert_eq!(indexed.index(1, 0), Some(1));
/// ```
pub struct EuclideanQuantizer {
    palette_quantizer: Box<dyn PaletteQuantizer + Send + Sync>,
    ditherer: Option<Box<dyn Ditherer + Send + Sync>>,
}

impl Default for EuclideanQuantizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EuclideanQuantizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EuclideanQuantizer")
            .field("dithering", &self.ditherer.is_some())
            .finish_non_exhaustive()
    }
}

impl EuclideanQuantizer {
    /// Octree palettes with Floyd-Steinberg dithering.
    pub fn new() -> Self {
        Self {
            palette_quantizer: Box::new(OctreeQuantizer),
            ditherer: Some(Box::new(FloydSteinberg)),
        }
    }

    /// Octree palettes, plain nearest-color mapping.
    pub fn without_dithering() -> Self {
        Self {
            palette_quantizer: Box::new(OctreeQuantizer),
            ditherer: None,
        }
    }

    /// Replace the ditherer (`None` disables error diffusion).
    pub fn with_ditherer(mut self, ditherer: Option<Box<dyn Ditherer + Send + Sync>>) -> Self {
        self.ditherer = ditherer;
        self
    }

    pub fn with_palette_quantizer(
        mut self,
        palette_quantizer: Box<dyn PaletteQuantizer + Send + Sync>,
    ) -> Self {
        self.palette_quantizer = palette_quantizer;
        self
    }

    #[inline]
    pub fn dithers(&self) -> bool {
        self.ditherer.is_some()
    }

    /// The palette `convert` would use for `target`.
    pub fn palette_for(&self, source: &Bitmap, target: PixelFormat) -> Result<Palette, QuantizeError> {
        match target {
            PixelFormat::Indexed1 => Ok(Palette::black_and_white()),
            PixelFormat::Indexed4 => self.palette_quantizer.create_palette(source, 16, 4),
            PixelFormat::Indexed8 => self.palette_quantizer.create_palette(source, 256, 8),
            other => Err(QuantizeError::UnsupportedDepth {
                bits: other.bits_per_pixel(),
            }),
        }
    }

    /// Produce an indexed copy of `source` at `target` depth.
    ///
    /// `source` is never modified; error diffusion runs on a private copy.
    ///
    /// # Errors
    ///
    /// - [`QuantizeError::UnsupportedDepth`] if `target` is not indexed
    /// - [`QuantizeError::UnsupportedPixelFormat`] if `source` is indexed
    pub fn convert(&self, source: &Bitmap, target: PixelFormat) -> Result<Bitmap, QuantizeError> {
        if !matches!(
            source.format(),
            PixelFormat::Rgb555 | PixelFormat::Bgr24 | PixelFormat::Bgra32
        ) {
            return Err(QuantizeError::UnsupportedPixelFormat {
                bits: source.format().bits_per_pixel(),
            });
        }

        let started = Instant::now();
        let palette = self.palette_for(source, target)?;
        let palette_built = started.elapsed();

        let mut output = Bitmap::new(source.width(), source.height(), target);
        output.set_palette(palette.colors().to_vec())?;

        let mapper = NearestColorMapper::new(&palette);
        let mut cache = ColorCache::new();
        let mut working = self.ditherer.as_ref().map(|_| source.clone());

        for y in 0..source.height() {
            for x in 0..source.width() {
                let image = working.as_ref().unwrap_or(source);
                let index = mapper.map(&mut cache, image.sample(x, y));
                output.set_index(x, y, index);

                if let (Some(ditherer), Some(image)) = (&self.ditherer, working.as_mut()) {
                    let chosen = palette.colors()[index as usize];
                    ditherer.disperse(image, x, y, chosen);
                }
            }
        }

        debug!(
            width = source.width(),
            height = source.height(),
            bits = target.bits_per_pixel(),
            cached = cache.len(),
            palette_ms = palette_built.as_secs_f64() * 1000.0,
            total_ms = started.elapsed().as_secs_f64() * 1000.0,
            "converted to indexed"
        );
        Ok(output)
    }
}
