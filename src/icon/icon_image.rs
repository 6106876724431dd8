use octree_quant::{Bitmap, PixelFormat, Rgb};

use super::check_dimensions;
use crate::dib::{stored_dimension, BitmapInfoHeader, GrpIconDirEntry, IconDirEntry};
use crate::encoder::{DibImage, ImageEncoder, ImageFormat};
use crate::error::IconError;
use crate::rendering::PngCodec;
use crate::transparency::MaskSource;

/// One sub-image of an icon.
///
/// Identified inside its icon by `(width, height, bit_count)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    encoder: ImageEncoder,
}

impl IconImage {
    /// Build a BMP-encoded image from a top-down bitmap.
    ///
    /// # Errors
    ///
    /// - [`IconError::ImageTooLarge`] above 256 pixels in either direction
    /// - [`IconError::InvalidImageFormat`] for a bitmap without pixels
    /// - [`IconError::MaskSizeMismatch`] for an explicit mask of the wrong
    ///   size or depth
    /// - [`IconError::Unsupported16bppMask`] when deriving a mask at 16 bpp
    pub fn from_bitmap(bitmap: &Bitmap, mask: MaskSource<'_>) -> Result<Self, IconError> {
        check_dimensions(bitmap.width(), bitmap.height())?;
        Ok(Self {
            encoder: ImageEncoder::Bmp(DibImage::from_bitmap(bitmap, mask)?),
        })
    }

    pub fn from_encoder(encoder: ImageEncoder) -> Result<Self, IconError> {
        let dib = encoder.dib();
        check_dimensions(dib.width(), dib.height())?;
        Ok(Self { encoder })
    }

    /// Decode a BMP or PNG resource.
    pub fn read(bytes: &[u8], codec: &dyn PngCodec) -> Result<Self, IconError> {
        Self::from_encoder(ImageEncoder::read(bytes, codec)?)
    }

    #[inline]
    pub fn encoder(&self) -> &ImageEncoder {
        &self.encoder
    }

    #[inline]
    fn dib(&self) -> &DibImage {
        self.encoder.dib()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.dib().width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dib().height()
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    #[inline]
    pub fn bit_count(&self) -> u16 {
        self.dib().bit_count()
    }

    /// Storage format of the color plane, if it is one this crate can decode.
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        PixelFormat::from_bits(self.bit_count())
    }

    pub fn colors_in_palette(&self) -> usize {
        self.encoder.colors_in_palette()
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        self.encoder.format()
    }

    /// Switch between BMP and PNG storage; the planes carry over unchanged.
    pub fn set_format(&mut self, format: ImageFormat) {
        if self.format() != format {
            self.encoder = self.encoder.clone().into_format(format);
        }
    }

    pub fn header(&self) -> &BitmapInfoHeader {
        self.dib().header()
    }

    pub fn palette(&self) -> &[Rgb] {
        self.dib().palette()
    }

    /// Color plane, rows bottom-up.
    pub fn xor(&self) -> &[u8] {
        self.dib().xor()
    }

    /// Mask plane, rows bottom-up.
    pub fn and(&self) -> &[u8] {
        self.dib().and()
    }

    /// The color plane as a top-down bitmap.
    pub fn to_bitmap(&self) -> Result<Bitmap, IconError> {
        self.dib().to_bitmap()
    }

    /// Top-down RGBA with the mask applied.
    pub fn to_rgba(&self) -> Result<Vec<u8>, IconError> {
        self.dib().to_rgba()
    }

    /// `ICONDIRENTRY` for this image. Offset and resource size are filled in
    /// by the writer.
    pub fn dir_entry(&self) -> IconDirEntry {
        let header = self.header();
        IconDirEntry {
            width: stored_dimension(self.width()),
            height: stored_dimension(self.height()),
            color_count: color_count(self.bit_count(), self.colors_in_palette()),
            reserved: 0,
            planes: header.planes,
            bit_count: header.bit_count,
            bytes_in_res: self.dib().bmp_size() as u32,
            image_offset: 0,
        }
    }

    /// `GRPICONDIRENTRY` for this image with resource id `id`.
    pub fn group_dir_entry(&self, id: u16, bytes_in_res: u32) -> GrpIconDirEntry {
        let entry = self.dir_entry();
        GrpIconDirEntry {
            width: entry.width,
            height: entry.height,
            color_count: entry.color_count,
            reserved: 0,
            planes: entry.planes,
            bit_count: entry.bit_count,
            bytes_in_res,
            id,
        }
    }
}

/// `ICONDIRENTRY::colorCount`: 0 for 256 colors and for direct color.
fn color_count(bit_count: u16, colors: usize) -> u8 {
    if bit_count > 8 {
        0
    } else {
        u8::try_from(colors).unwrap_or(0)
    }
}
