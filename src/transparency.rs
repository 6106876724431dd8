//! AND-mask derivation.
//!
//! An AND mask has one bit per pixel, MSB first, rows padded to 32 bits.
//! A set bit hides the pixel. The rules differ per color depth:
//!
//! | bpp | rule                                                           |
//! |-----|----------------------------------------------------------------|
//! | 1   | the color plane doubles as the mask                            |
//! | 4/8 | palette entry equals the color: set bit, zero the index        |
//! | 16  | unsupported                                                    |
//! | 24  | RGB equals the color: set bit                                  |
//! | 32  | alpha rule: set bit where alpha is 0                           |
//! |     | color rule: on match set bit and zero RGB, otherwise alpha 255 |
//!
//! The alpha rule never matches at 4, 8 and 24 bpp since those planes carry
//! no alpha.

use octree_quant::{stride, BitPacker, Bitmap, IndexDepth, PixelFormat, Rgb};

use crate::error::IconError;

/// Which pixels of a color plane count as transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparentColor {
    /// Pixels whose alpha is 0.
    Alpha,
    /// Pixels of exactly this color.
    Rgb(Rgb),
}

/// Where the AND mask of a new sub-image comes from.
#[derive(Debug, Clone, Copy)]
pub enum MaskSource<'a> {
    /// Derive it from the color plane.
    Derive(TransparentColor),
    /// Use this 1 bpp bitmap (top-down, same size as the image).
    Bitmap(&'a Bitmap),
}

/// Byte layout of one color plane.
#[derive(Debug, Clone, Copy)]
pub struct PlaneLayout {
    pub width: u32,
    pub height: u32,
    pub bits: u16,
}

impl PlaneLayout {
    #[inline]
    pub fn xor_stride(&self) -> usize {
        stride(self.width, self.bits)
    }

    #[inline]
    pub fn and_stride(&self) -> usize {
        stride(self.width, 1)
    }

    #[inline]
    pub fn and_len(&self) -> usize {
        self.and_stride() * self.height as usize
    }
}

/// Builds AND masks from color planes or explicit mask bitmaps.
pub struct TransparencyMaskDeriver;

impl TransparencyMaskDeriver {
    /// Compute the AND mask for `xor`, zeroing transparent pixels where the
    /// depth's rule says so.
    ///
    /// Row order does not matter; the mask comes out in the same order as
    /// `xor`.
    pub fn derive(
        layout: PlaneLayout,
        palette: &[Rgb],
        xor: &mut [u8],
        rule: TransparentColor,
    ) -> Result<Vec<u8>, IconError> {
        let xor_stride = layout.xor_stride();
        let and_stride = layout.and_stride();
        let mut and = vec![0u8; layout.and_len()];
        let expected = xor_stride * layout.height as usize;
        if xor.len() != expected {
            return Err(IconError::InvalidImageFormat(format!(
                "color plane holds {} bytes, expected {expected}",
                xor.len()
            )));
        }

        match layout.bits {
            1 => {
                and.copy_from_slice(xor);
                return Ok(and);
            }
            16 => return Err(IconError::Unsupported16bppMask),
            4 | 8 | 24 | 32 => {}
            bits => return Err(IconError::UnsupportedPixelFormat { bits }),
        }

        for y in 0..layout.height as usize {
            let row = &mut xor[y * xor_stride..(y + 1) * xor_stride];
            let mask_row = &mut and[y * and_stride..(y + 1) * and_stride];
            for x in 0..layout.width as usize {
                if pixel_is_transparent(row, x, layout.bits, palette, rule) {
                    BitPacker::pack(mask_row, x, IndexDepth::One, 1);
                }
            }
        }
        Ok(and)
    }

    /// Check an explicit mask against the image size and return its rows
    /// bottom-up, ready to be stored as an AND plane.
    pub fn from_mask(width: u32, height: u32, mask: &Bitmap) -> Result<Vec<u8>, IconError> {
        if mask.width() != width
            || mask.height() != height
            || mask.format() != PixelFormat::Indexed1
        {
            return Err(IconError::MaskSizeMismatch {
                expected_width: width,
                expected_height: height,
                width: mask.width(),
                height: mask.height(),
                bits: mask.format().bits_per_pixel(),
            });
        }
        let mut flipped = mask.clone();
        flipped.flip_vertical();
        Ok(flipped.into_data())
    }
}

/// Test one pixel and apply the depth's XOR mutation.
fn pixel_is_transparent(
    row: &mut [u8],
    x: usize,
    bits: u16,
    palette: &[Rgb],
    rule: TransparentColor,
) -> bool {
    match bits {
        4 | 8 => {
            let TransparentColor::Rgb(color) = rule else {
                return false;
            };
            let depth = if bits == 4 {
                IndexDepth::Four
            } else {
                IndexDepth::Eight
            };
            let index = BitPacker::unpack(row, x, depth) as usize;
            if palette.get(index) == Some(&color) {
                BitPacker::pack(row, x, depth, 0);
                true
            } else {
                false
            }
        }
        24 => {
            let TransparentColor::Rgb(color) = rule else {
                return false;
            };
            let px = &row[x * 3..x * 3 + 3];
            Rgb::new(px[2], px[1], px[0]) == color
        }
        32 => {
            let px = &mut row[x * 4..x * 4 + 4];
            match rule {
                TransparentColor::Alpha => px[3] == 0,
                TransparentColor::Rgb(color) => {
                    if Rgb::new(px[2], px[1], px[0]) == color {
                        px[..3].fill(0);
                        true
                    } else {
                        px[3] = 255;
                        false
                    }
                }
            }
        }
        _ => false,
    }
}
