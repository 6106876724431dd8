//! Error diffusion.
//!
//! The quantizer visits pixels in row-major order and, after choosing a
//! palette entry for a pixel, hands the working image to a [`Ditherer`] so
//! the residual error can be pushed onto pixels that have not been visited
//! yet. Reordering the traversal changes the output.

mod floyd_steinberg;
mod kernel;

pub use floyd_steinberg::FloydSteinberg;
pub use kernel::*;

use crate::bitmap::Bitmap;
use crate::color::Rgb;

/// Spreads the quantization error of one pixel to its unvisited neighbors.
pub trait Ditherer {
    /// Distribute `image.pixel(x, y) - chosen` over the neighbors of
    /// `(x, y)`, writing the adjusted colors back into `image`.
    fn disperse(&self, image: &mut Bitmap, x: u32, y: u32, chosen: Rgb);
}

/// Apply `kernel` around `(x, y)`. Neighbors outside the image are skipped
/// and their share of the error is dropped.
pub fn diffuse_with_kernel(kernel: &Kernel, image: &mut Bitmap, x: u32, y: u32, chosen: Rgb) {
    let source = image.pixel(x, y);
    let error = [
        source.r as i32 - chosen.r as i32,
        source.g as i32 - chosen.g as i32,
        source.b as i32 - chosen.b as i32,
    ];
    if error == [0, 0, 0] {
        return;
    }

    let divisor = kernel.divisor as i32;
    for &(dx, dy, weight) in kernel.entries {
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= image.width() as i64 || ny >= image.height() as i64 {
            continue;
        }
        let (nx, ny) = (nx as u32, ny as u32);
        let weight = weight as i32;
        let adjust = |channel: u8, error: i32| -> u8 {
            (channel as i32 + error * weight / divisor).clamp(0, 255) as u8
        };
        let neighbor = image.pixel(nx, ny);
        image.set_pixel(
            nx,
            ny,
            Rgb::new(
                adjust(neighbor.r, error[0]),
                adjust(neighbor.g, error[1]),
                adjust(neighbor.b, error[2]),
            ),
        );
    }
}

/// A [`Ditherer`] driven by an arbitrary diffusion [`Kernel`].
#[derive(Debug, Clone, Copy)]
pub struct KernelDitherer {
    kernel: Kernel,
}

impl KernelDitherer {
    pub fn new(kernel: Kernel) -> Self {
        Self { kernel }
    }
}

impl Ditherer for KernelDitherer {
    fn disperse(&self, image: &mut Bitmap, x: u32, y: u32, chosen: Rgb) {
        diffuse_with_kernel(&self.kernel, image, x, y, chosen);
    }
}
