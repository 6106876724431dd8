//! In-memory raster images.
//!
//! [`Bitmap`] is a top-down raster in the little-endian channel order used by
//! device-independent bitmaps: `B, G, R` for 24 bpp and `B, G, R, A` for
//! 32 bpp, 5-5-5 packed `u16` for 16 bpp, and packed palette indices for the
//! indexed formats. Every row is padded to a 32-bit boundary.

use crate::bits::{stride, BitPacker, IndexDepth};
use crate::color::{ChannelMask, Rgb};
use crate::error::QuantizeError;

/// Storage layout of a [`Bitmap`] pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Indexed1,
    Indexed4,
    Indexed8,
    /// 16 bpp, `0RRRRRGGGGGBBBBB` little-endian.
    Rgb555,
    Bgr24,
    /// 32 bpp with straight (non-premultiplied) alpha.
    Bgra32,
}

impl PixelFormat {
    pub fn bits_per_pixel(self) -> u16 {
        match self {
            PixelFormat::Indexed1 => 1,
            PixelFormat::Indexed4 => 4,
            PixelFormat::Indexed8 => 8,
            PixelFormat::Rgb555 => 16,
            PixelFormat::Bgr24 => 24,
            PixelFormat::Bgra32 => 32,
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            1 => Some(PixelFormat::Indexed1),
            4 => Some(PixelFormat::Indexed4),
            8 => Some(PixelFormat::Indexed8),
            16 => Some(PixelFormat::Rgb555),
            24 => Some(PixelFormat::Bgr24),
            32 => Some(PixelFormat::Bgra32),
            _ => None,
        }
    }

    /// The packing depth for indexed formats, `None` for direct color.
    pub fn index_depth(self) -> Option<IndexDepth> {
        match self {
            PixelFormat::Indexed1 => Some(IndexDepth::One),
            PixelFormat::Indexed4 => Some(IndexDepth::Four),
            PixelFormat::Indexed8 => Some(IndexDepth::Eight),
            _ => None,
        }
    }

    #[inline]
    pub fn is_indexed(self) -> bool {
        self.index_depth().is_some()
    }

    /// Palette capacity: `2^bpp` for indexed formats, 0 otherwise.
    pub fn palette_len(self) -> usize {
        self.index_depth().map_or(0, IndexDepth::max_colors)
    }
}

/// One decoded source pixel plus the key used to cache its palette lookup.
///
/// The key is the raw 16-bit value for 5-5-5 pixels and the packed 24-bit RGB
/// value for every other format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub rgb: Rgb,
    pub key: u32,
}

/// A top-down raster image with 32-bit aligned rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    stride: usize,
    data: Vec<u8>,
    palette: Vec<Rgb>,
}

impl Bitmap {
    /// Create a zero-filled bitmap. Indexed formats get an all-black palette
    /// of full capacity.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let stride = stride(width, format.bits_per_pixel());
        Self {
            width,
            height,
            format,
            stride,
            data: vec![0; stride * height as usize],
            palette: vec![Rgb::BLACK; format.palette_len()],
        }
    }

    /// Wrap an existing row-padded buffer.
    ///
    /// # Errors
    ///
    /// - [`QuantizeError::BufferSize`] if `data` is not `stride * height` bytes
    /// - [`QuantizeError::PaletteSizeExceeded`] if `palette` is larger than the
    ///   format can address
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
        palette: Vec<Rgb>,
    ) -> Result<Self, QuantizeError> {
        let stride = stride(width, format.bits_per_pixel());
        let expected = stride * height as usize;
        if data.len() != expected {
            return Err(QuantizeError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        let mut bitmap = Self {
            width,
            height,
            format,
            stride,
            data,
            palette: Vec::new(),
        };
        bitmap.set_palette(palette)?;
        Ok(bitmap)
    }

    /// Build a [`PixelFormat::Bgra32`] bitmap from tightly packed RGBA bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, QuantizeError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(QuantizeError::BufferSize {
                expected,
                actual: rgba.len(),
            });
        }
        let mut bitmap = Self::new(width, height, PixelFormat::Bgra32);
        for (dst, src) in bitmap.data.chunks_exact_mut(4).zip(rgba.chunks_exact(4)) {
            dst.copy_from_slice(&[src[2], src[1], src[0], src[3]]);
        }
        Ok(bitmap)
    }

    /// Tightly packed RGBA bytes, top-down. Non-alpha formats are opaque.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let rgb = self.pixel(x, y);
                rgba.extend_from_slice(&[rgb.r, rgb.g, rgb.b, self.alpha(x, y)]);
            }
        }
        rgba
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    /// Replace the palette. Shorter palettes are zero-filled to capacity.
    pub fn set_palette(&mut self, mut palette: Vec<Rgb>) -> Result<(), QuantizeError> {
        let limit = self.format.palette_len();
        if palette.len() > limit {
            return Err(QuantizeError::PaletteSizeExceeded {
                requested: palette.len(),
                limit,
            });
        }
        palette.resize(limit, Rgb::BLACK);
        self.palette = palette;
        Ok(())
    }

    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.stride]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        &mut self.data[start..start + self.stride]
    }

    /// Palette index at `(x, y)`, or `None` for direct-color formats.
    pub fn index(&self, x: u32, y: u32) -> Option<u8> {
        let depth = self.format.index_depth()?;
        Some(BitPacker::unpack(self.row(y), x as usize, depth))
    }

    /// Store a palette index at `(x, y)`. Ignored for direct-color formats.
    pub fn set_index(&mut self, x: u32, y: u32, index: u8) {
        if let Some(depth) = self.format.index_depth() {
            BitPacker::pack(self.row_mut(y), x as usize, depth, index);
        }
    }

    /// Decoded color at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.sample(x, y).rgb
    }

    /// Alpha at `(x, y)`; 255 for formats without an alpha channel.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        match self.format {
            PixelFormat::Bgra32 => self.row(y)[x as usize * 4 + 3],
            _ => 255,
        }
    }

    /// Decode the pixel at `(x, y)` together with its cache key.
    pub fn sample(&self, x: u32, y: u32) -> Sample {
        let row = self.row(y);
        let x = x as usize;
        match self.format {
            PixelFormat::Rgb555 => {
                let raw = u16::from_le_bytes([row[x * 2], row[x * 2 + 1]]) as u32;
                Sample {
                    rgb: Rgb::new(
                        ChannelMask::RGB555_RED.extract(raw),
                        ChannelMask::RGB555_GREEN.extract(raw),
                        ChannelMask::RGB555_BLUE.extract(raw),
                    ),
                    key: raw,
                }
            }
            PixelFormat::Bgr24 | PixelFormat::Bgra32 => {
                let offset = x * (self.format.bits_per_pixel() as usize / 8);
                let rgb = Rgb::new(row[offset + 2], row[offset + 1], row[offset]);
                Sample {
                    rgb,
                    key: rgb.packed(),
                }
            }
            PixelFormat::Indexed1 | PixelFormat::Indexed4 | PixelFormat::Indexed8 => {
                let index = self
                    .format
                    .index_depth()
                    .map_or(0, |depth| BitPacker::unpack(row, x, depth));
                let rgb = self
                    .palette
                    .get(index as usize)
                    .copied()
                    .unwrap_or_default();
                Sample {
                    rgb,
                    key: rgb.packed(),
                }
            }
        }
    }

    /// Overwrite the color channels at `(x, y)`, keeping any alpha.
    ///
    /// 5-5-5 pixels keep the top five bits of each channel. Ignored for
    /// indexed formats.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: Rgb) {
        let format = self.format;
        let row = self.row_mut(y);
        let x = x as usize;
        match format {
            PixelFormat::Rgb555 => {
                let raw = ChannelMask::RGB555_RED.insert(rgb.r)
                    | ChannelMask::RGB555_GREEN.insert(rgb.g)
                    | ChannelMask::RGB555_BLUE.insert(rgb.b);
                row[x * 2..x * 2 + 2].copy_from_slice(&(raw as u16).to_le_bytes());
            }
            PixelFormat::Bgr24 | PixelFormat::Bgra32 => {
                let offset = x * (format.bits_per_pixel() as usize / 8);
                row[offset] = rgb.b;
                row[offset + 1] = rgb.g;
                row[offset + 2] = rgb.r;
            }
            _ => {}
        }
    }

    /// Reverse the row order in place (top-down ⇄ bottom-up).
    pub fn flip_vertical(&mut self) {
        let stride = self.stride;
        let height = self.height as usize;
        for y in 0..height / 2 {
            let (top, bottom) = self.data.split_at_mut((height - 1 - y) * stride);
            top[y * stride..(y + 1) * stride].swap_with_slice(&mut bottom[..stride]);
        }
    }
}
