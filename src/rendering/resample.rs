use image::{imageops, ImageBuffer, Rgba};
use octree_quant::Bitmap;

use crate::error::IconError;

/// Scales a bitmap to a new size.
pub trait Resampler {
    /// Produce a 32 bpp copy of `source` scaled to `width` x `height`.
    fn resize(&self, source: &Bitmap, width: u32, height: u32) -> Result<Bitmap, IconError>;
}

/// Lanczos3 resampling through `image::imageops`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LanczosResampler;

impl Resampler for LanczosResampler {
    fn resize(&self, source: &Bitmap, width: u32, height: u32) -> Result<Bitmap, IconError> {
        let src: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(source.width(), source.height(), source.to_rgba()).ok_or_else(
                || {
                    IconError::InvalidImageFormat(format!(
                        "cannot wrap {}x{} source for resampling",
                        source.width(),
                        source.height()
                    ))
                },
            )?;

        let resized = imageops::resize(&src, width, height, imageops::FilterType::Lanczos3);
        tracing::debug!(
            from_width = source.width(),
            from_height = source.height(),
            width,
            height,
            "resampled"
        );
        Ok(Bitmap::from_rgba(width, height, &resized.into_raw())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use octree_quant::{PixelFormat, Rgb};

    #[test]
    fn test_resize_solid_color_stays_solid() {
        let rgba: Vec<u8> = [200, 100, 50, 255].repeat(64 * 64);
        let source = Bitmap::from_rgba(64, 64, &rgba).unwrap();
        let resized = LanczosResampler.resize(&source, 16, 16).unwrap();

        assert_eq!(resized.width(), 16);
        assert_eq!(resized.format(), PixelFormat::Bgra32);
        assert_eq!(resized.pixel(7, 9), Rgb::new(200, 100, 50));
        assert_eq!(resized.alpha(0, 0), 255);
    }

    #[test]
    fn test_resize_non_square_source() {
        let rgba = vec![255u8; 40 * 20 * 4];
        let source = Bitmap::from_rgba(40, 20, &rgba).unwrap();
        let resized = LanczosResampler.resize(&source, 32, 32).unwrap();
        assert_eq!((resized.width(), resized.height()), (32, 32));
    }
}
