//! Floyd-Steinberg error diffusion.

use super::{diffuse_with_kernel, Ditherer, FLOYD_STEINBERG};
use crate::bitmap::Bitmap;
use crate::color::Rgb;

/// Floyd-Steinberg error diffusion, the default [`Ditherer`].
///
/// Weights: 7/16 right, 3/16 bottom-left, 5/16 bottom, 1/16 bottom-right.
/// Adjusted channels are clamped to `0..=255` and stored back in the pixel's
/// own format, so 5-5-5 sources lose the low three bits of each correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloydSteinberg;

impl Ditherer for FloydSteinberg {
    fn disperse(&self, image: &mut Bitmap, x: u32, y: u32, chosen: Rgb) {
        diffuse_with_kernel(&FLOYD_STEINBERG, image, x, y, chosen);
    }
}
