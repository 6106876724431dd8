//! Multi-resolution icon synthesis from a single ARGB source.
//!
//! For every requested resolution the source is resampled once. The 32 bpp
//! image is built first and its alpha-derived AND mask is reused verbatim by
//! the indexed images at the same resolution, so every depth hides exactly
//! the same pixels.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use octree_quant::{Bitmap, EuclideanQuantizer, PixelFormat};
use tracing::{debug, info};

use crate::encoder::{DibImage, ImageEncoder, ImageFormat};
use crate::error::IconError;
use crate::icon::{check_dimensions, IconImage, MAX_ICON_SIZE};
use crate::models::{IconOutputFormat, IconTarget, SynthesisConfig};
use crate::rendering::{LanczosResampler, Resampler};
use crate::transparency::{MaskSource, TransparentColor};

pub struct IconSynthesizer {
    quantizer: EuclideanQuantizer,
    resampler: Box<dyn Resampler + Send + Sync>,
    vista_png: bool,
}

impl Default for IconSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for IconSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconSynthesizer")
            .field("quantizer", &self.quantizer)
            .field("vista_png", &self.vista_png)
            .finish_non_exhaustive()
    }
}

impl IconSynthesizer {
    /// Dithering octree quantizer, Lanczos3 resampling, PNG for 256x256.
    pub fn new() -> Self {
        Self {
            quantizer: EuclideanQuantizer::new(),
            resampler: Box::new(LanczosResampler),
            vista_png: true,
        }
    }

    pub fn from_config(config: &SynthesisConfig) -> Self {
        let quantizer = if config.dither {
            EuclideanQuantizer::new()
        } else {
            EuclideanQuantizer::without_dithering()
        };
        Self::new()
            .with_quantizer(quantizer)
            .with_vista_png(config.vista_png)
    }

    pub fn with_quantizer(mut self, quantizer: EuclideanQuantizer) -> Self {
        self.quantizer = quantizer;
        self
    }

    pub fn with_resampler(mut self, resampler: Box<dyn Resampler + Send + Sync>) -> Self {
        self.resampler = resampler;
        self
    }

    pub fn with_vista_png(mut self, vista_png: bool) -> Self {
        self.vista_png = vista_png;
        self
    }

    #[inline]
    pub fn quantizer(&self) -> &EuclideanQuantizer {
        &self.quantizer
    }

    /// Synthesize every target of `format`.
    pub fn synthesize_format(
        &self,
        source: &Bitmap,
        format: IconOutputFormat,
    ) -> Result<Vec<IconImage>, IconError> {
        self.synthesize(source, &format.targets())
    }

    /// Synthesize one image per target, largest resolution first and deepest
    /// color first within a resolution.
    ///
    /// # Errors
    ///
    /// - [`IconError::InvalidPixelFormat`] unless `source` is 32 bpp ARGB
    /// - [`IconError::ImageTooLarge`] for a target above 256 pixels
    /// - [`IconError::InvalidImageFormat`] for a zero-sized target
    /// - [`IconError::DuplicateResolution`] when a target is listed twice
    /// - [`IconError::UnsupportedPixelFormat`] for a depth other than 1, 4,
    ///   8 or 32
    pub fn synthesize(
        &self,
        source: &Bitmap,
        targets: &[IconTarget],
    ) -> Result<Vec<IconImage>, IconError> {
        if source.format() != PixelFormat::Bgra32 {
            return Err(IconError::InvalidPixelFormat {
                bits: source.format().bits_per_pixel(),
            });
        }

        // resolution -> depths, both descending on iteration
        let mut plan: BTreeMap<u32, Vec<u16>> = BTreeMap::new();
        let mut seen = HashSet::new();
        for target in targets {
            check_dimensions(target.size, target.size)?;
            if !matches!(target.bits, 1 | 4 | 8 | 32) {
                return Err(IconError::UnsupportedPixelFormat { bits: target.bits });
            }
            if !seen.insert(*target) {
                return Err(IconError::DuplicateResolution {
                    width: target.size,
                    height: target.size,
                    bits: target.bits,
                });
            }
            plan.entry(target.size).or_default().push(target.bits);
        }

        let mut images = Vec::with_capacity(targets.len());
        for (&size, depths) in plan.iter_mut().rev() {
            depths.sort_unstable_by(|a, b| b.cmp(a));
            self.synthesize_resolution(source, size, depths, &mut images)?;
        }
        Ok(images)
    }

    fn synthesize_resolution(
        &self,
        source: &Bitmap,
        size: u32,
        depths: &[u16],
        images: &mut Vec<IconImage>,
    ) -> Result<(), IconError> {
        let started = Instant::now();
        let resized = if source.width() == size && source.height() == size {
            source.clone()
        } else {
            self.resampler.resize(source, size, size)?
        };

        let argb = DibImage::from_bitmap(&resized, MaskSource::Derive(TransparentColor::Alpha))?;
        let and = argb.and().to_vec();

        for &bits in depths {
            let image = if bits == 32 {
                let format = if size == MAX_ICON_SIZE && self.vista_png {
                    ImageFormat::Png
                } else {
                    ImageFormat::Bmp
                };
                let encoder = ImageEncoder::Bmp(argb.clone()).into_format(format);
                IconImage::from_encoder(encoder)?
            } else {
                let format = PixelFormat::from_bits(bits)
                    .ok_or(IconError::UnsupportedPixelFormat { bits })?;
                let indexed = self.quantizer.convert(&resized, format)?;
                let dib = DibImage::from_bitmap_with_and(&indexed, and.clone())?;
                IconImage::from_encoder(ImageEncoder::Bmp(dib))?
            };
            info!(
                width = size,
                height = size,
                bits,
                format = ?image.format(),
                colors = image.colors_in_palette(),
                "Synthesized icon image"
            );
            images.push(image);
        }

        debug!(
            size,
            depths = depths.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Synthesized resolution"
        );
        Ok(())
    }
}
