//! Sub-image storage: BMP (DIB) and PNG encoders.
//!
//! Both encoders own the same [`DibImage`]: header, palette, XOR (color)
//! plane and AND (mask) plane, planes stored bottom-up. They only differ in
//! how the record is serialized inside an icon resource.

use std::io::{Cursor, Read, Write};

use octree_quant::{stride, BitPacker, Bitmap, IndexDepth, PixelFormat, Rgb};
use serde::Serialize;

use crate::dib::{BitmapInfoHeader, RgbQuad, BITMAPINFOHEADER_SIZE, RGBQUAD_SIZE};
use crate::error::IconError;
use crate::icon::MAX_ICON_SIZE;
use crate::rendering::PngCodec;
use crate::transparency::{MaskSource, PlaneLayout, TransparencyMaskDeriver, TransparentColor};

const PNG_SIGNATURE: [u8; 3] = [0x89, b'P', b'N'];

/// Serialization of a sub-image resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Bmp,
    Png,
}

impl ImageFormat {
    /// Detect the format of a resource from its first bytes.
    pub fn detect(bytes: &[u8]) -> Result<Self, IconError> {
        if bytes.len() >= 4
            && u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
                == BITMAPINFOHEADER_SIZE as u32
        {
            Ok(ImageFormat::Bmp)
        } else if bytes.starts_with(&PNG_SIGNATURE) {
            Ok(ImageFormat::Png)
        } else {
            Err(IconError::InvalidFile(format!(
                "unrecognized image resource starting with {:02x?}",
                &bytes[..bytes.len().min(4)]
            )))
        }
    }
}

/// Header, palette and both planes of one sub-image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DibImage {
    header: BitmapInfoHeader,
    palette: Vec<Rgb>,
    xor: Vec<u8>,
    and: Vec<u8>,
}

impl DibImage {
    /// Build a record from a top-down bitmap, deriving or copying the mask.
    pub fn from_bitmap(bitmap: &Bitmap, mask: MaskSource<'_>) -> Result<Self, IconError> {
        let layout = layout_of(bitmap);
        let mut image = bitmap.clone();
        image.flip_vertical();
        let palette = image.palette().to_vec();
        let mut xor = image.into_data();

        let and = match mask {
            MaskSource::Derive(rule) => {
                TransparencyMaskDeriver::derive(layout, &palette, &mut xor, rule)?
            }
            MaskSource::Bitmap(mask) => {
                TransparencyMaskDeriver::from_mask(layout.width, layout.height, mask)?
            }
        };
        Ok(Self::from_planes(layout, palette, xor, and))
    }

    /// Build a record from a top-down bitmap and an AND plane that is
    /// already bottom-up (typically taken from a sibling image).
    pub fn from_bitmap_with_and(bitmap: &Bitmap, and: Vec<u8>) -> Result<Self, IconError> {
        let layout = layout_of(bitmap);
        if and.len() != layout.and_len() {
            return Err(IconError::MaskSizeMismatch {
                expected_width: layout.width,
                expected_height: layout.height,
                width: layout.width,
                height: (and.len() / layout.and_stride().max(1)) as u32,
                bits: 1,
            });
        }
        let mut image = bitmap.clone();
        image.flip_vertical();
        let palette = image.palette().to_vec();
        Ok(Self::from_planes(layout, palette, image.into_data(), and))
    }

    fn from_planes(layout: PlaneLayout, palette: Vec<Rgb>, xor: Vec<u8>, and: Vec<u8>) -> Self {
        let header = BitmapInfoHeader::new(
            layout.width,
            layout.height,
            layout.bits,
            palette.len() as u32,
        );
        let mut dib = Self {
            header,
            palette,
            xor: Vec::new(),
            and,
        };
        dib.set_xor(xor);
        dib
    }

    /// Parse header, palette, XOR and AND from a BMP resource.
    ///
    /// The header is checked against the icon limits and the resource length
    /// before any plane is allocated.
    pub fn read_bmp(bytes: &[u8]) -> Result<Self, IconError> {
        let mut reader = Cursor::new(bytes);
        let header = BitmapInfoHeader::read(&mut reader).map_err(|_| {
            IconError::InvalidFile(format!(
                "BMP header needs {BITMAPINFOHEADER_SIZE} bytes, resource holds {}",
                bytes.len()
            ))
        })?;
        if header.compression != 0 {
            return Err(IconError::InvalidImageFormat(format!(
                "compressed DIB (compression {}) is not supported",
                header.compression
            )));
        }
        let width = header.image_width();
        let height = header.image_height();
        if !(1..=MAX_ICON_SIZE).contains(&width) || !(1..=MAX_ICON_SIZE).contains(&height) {
            return Err(IconError::InvalidFile(format!(
                "BMP header claims {width}x{height} pixels"
            )));
        }
        if !matches!(header.bit_count, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(IconError::InvalidFile(format!(
                "BMP header claims {} bpp",
                header.bit_count
            )));
        }
        let colors = header.colors_in_palette();
        if colors > 256 {
            return Err(IconError::InvalidFile(format!(
                "BMP header claims {colors} palette entries"
            )));
        }

        let xor_len = plane_len(width, height, header.bit_count)?;
        let and_len = plane_len(width, height, 1)?;
        let needed = colors
            .checked_mul(RGBQUAD_SIZE)
            .and_then(|n| n.checked_add(BITMAPINFOHEADER_SIZE))
            .and_then(|n| n.checked_add(xor_len))
            .and_then(|n| n.checked_add(and_len))
            .ok_or_else(|| IconError::InvalidFile("BMP planes overflow".to_string()))?;
        if bytes.len() < needed {
            return Err(IconError::InvalidFile(format!(
                "BMP resource holds {} bytes, header needs {needed}",
                bytes.len()
            )));
        }

        let mut palette = Vec::with_capacity(colors);
        for _ in 0..colors {
            palette.push(Rgb::from(RgbQuad::read(&mut reader)?));
        }

        let mut xor = vec![0u8; xor_len];
        reader.read_exact(&mut xor)?;
        let mut and = vec![0u8; and_len];
        reader.read_exact(&mut and)?;

        Ok(Self {
            header,
            palette,
            xor,
            and,
        })
    }

    /// Emit header, palette, XOR and AND in DIB order.
    pub fn write_bmp<W: Write>(&self, writer: &mut W) -> Result<(), IconError> {
        self.header.write(writer)?;
        for index in 0..self.colors_in_palette() {
            let color = self.palette.get(index).copied().unwrap_or_default();
            RgbQuad::from(color).write(writer)?;
        }
        writer.write_all(&self.xor)?;
        writer.write_all(&self.and)?;
        Ok(())
    }

    #[inline]
    pub fn header(&self) -> &BitmapInfoHeader {
        &self.header
    }

    #[inline]
    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    #[inline]
    pub fn xor(&self) -> &[u8] {
        &self.xor
    }

    #[inline]
    pub fn and(&self) -> &[u8] {
        &self.and
    }

    /// Replace the color plane; keeps `biSizeImage` in step.
    pub fn set_xor(&mut self, xor: Vec<u8>) {
        self.header.size_image = xor.len() as u32;
        self.xor = xor;
    }

    pub fn set_and(&mut self, and: Vec<u8>) {
        self.and = and;
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.header.image_width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.header.image_height()
    }

    #[inline]
    pub fn bit_count(&self) -> u16 {
        self.header.bit_count
    }

    pub fn colors_in_palette(&self) -> usize {
        self.header.colors_in_palette()
    }

    /// Serialized size as a BMP resource.
    pub fn bmp_size(&self) -> usize {
        BITMAPINFOHEADER_SIZE
            + RGBQUAD_SIZE * self.colors_in_palette()
            + self.xor.len()
            + self.and.len()
    }

    /// Decode the XOR plane into a top-down bitmap.
    pub fn to_bitmap(&self) -> Result<Bitmap, IconError> {
        let format = PixelFormat::from_bits(self.bit_count()).ok_or(
            IconError::UnsupportedPixelFormat {
                bits: self.bit_count(),
            },
        )?;
        let mut palette = self.palette.clone();
        palette.truncate(format.palette_len());
        let mut bitmap =
            Bitmap::from_raw(self.width(), self.height(), format, self.xor.clone(), palette)?;
        bitmap.flip_vertical();
        Ok(bitmap)
    }

    /// Composite both planes into top-down RGBA.
    ///
    /// A set AND bit makes the pixel fully transparent. 32 bpp images keep
    /// their own alpha everywhere else; other depths are opaque.
    pub fn to_rgba(&self) -> Result<Vec<u8>, IconError> {
        let bitmap = self.to_bitmap()?;
        let mut rgba = bitmap.to_rgba();
        let width = self.width() as usize;
        let height = self.height() as usize;
        let and_stride = stride(self.width(), 1);
        if self.and.len() < and_stride * height {
            return Ok(rgba);
        }
        for y in 0..height {
            // AND rows are bottom-up
            let mask_row = &self.and[(height - 1 - y) * and_stride..(height - y) * and_stride];
            for x in 0..width {
                if BitPacker::unpack(mask_row, x, IndexDepth::One) == 1 {
                    rgba[(y * width + x) * 4 + 3] = 0;
                }
            }
        }
        Ok(rgba)
    }
}

fn plane_len(width: u32, height: u32, bits: u16) -> Result<usize, IconError> {
    stride(width, bits)
        .checked_mul(height as usize)
        .ok_or_else(|| IconError::InvalidFile(format!("{width}x{height} plane overflows")))
}

fn layout_of(bitmap: &Bitmap) -> PlaneLayout {
    PlaneLayout {
        width: bitmap.width(),
        height: bitmap.height(),
        bits: bitmap.format().bits_per_pixel(),
    }
}

/// One sub-image, tagged with how it is serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEncoder {
    Bmp(DibImage),
    Png(DibImage),
}

impl ImageEncoder {
    /// Decode a resource, detecting BMP or PNG from its signature.
    ///
    /// PNG resources get their AND plane from the pixels' own alpha.
    pub fn read(bytes: &[u8], codec: &dyn PngCodec) -> Result<Self, IconError> {
        match ImageFormat::detect(bytes)? {
            ImageFormat::Bmp => Ok(ImageEncoder::Bmp(DibImage::read_bmp(bytes)?)),
            ImageFormat::Png => {
                let decoded = codec.decode(bytes)?;
                let bitmap = Bitmap::from_rgba(decoded.width, decoded.height, &decoded.rgba)?;
                let dib =
                    DibImage::from_bitmap(&bitmap, MaskSource::Derive(TransparentColor::Alpha))?;
                Ok(ImageEncoder::Png(dib))
            }
        }
    }

    /// Serialize the resource.
    pub fn write<W: Write>(&self, writer: &mut W, codec: &dyn PngCodec) -> Result<(), IconError> {
        match self {
            ImageEncoder::Bmp(dib) => dib.write_bmp(writer),
            ImageEncoder::Png(dib) => {
                let rgba = dib.to_rgba()?;
                writer.write_all(&codec.encode(&rgba, dib.width(), dib.height())?)?;
                Ok(())
            }
        }
    }

    /// Serialize the resource into a fresh buffer.
    pub fn encode(&self, codec: &dyn PngCodec) -> Result<Vec<u8>, IconError> {
        let mut buf = Vec::with_capacity(self.dib().bmp_size());
        self.write(&mut buf, codec)?;
        Ok(buf)
    }

    /// Size of the serialized resource. PNG resources are encoded to find out.
    pub fn image_size(&self, codec: &dyn PngCodec) -> Result<usize, IconError> {
        match self {
            ImageEncoder::Bmp(dib) => Ok(dib.bmp_size()),
            ImageEncoder::Png(_) => Ok(self.encode(codec)?.len()),
        }
    }

    #[inline]
    pub fn format(&self) -> ImageFormat {
        match self {
            ImageEncoder::Bmp(_) => ImageFormat::Bmp,
            ImageEncoder::Png(_) => ImageFormat::Png,
        }
    }

    #[inline]
    pub fn dib(&self) -> &DibImage {
        match self {
            ImageEncoder::Bmp(dib) | ImageEncoder::Png(dib) => dib,
        }
    }

    #[inline]
    pub fn dib_mut(&mut self) -> &mut DibImage {
        match self {
            ImageEncoder::Bmp(dib) | ImageEncoder::Png(dib) => dib,
        }
    }

    pub fn into_dib(self) -> DibImage {
        match self {
            ImageEncoder::Bmp(dib) | ImageEncoder::Png(dib) => dib,
        }
    }

    /// Take over another encoder's record verbatim, keeping this encoder's
    /// format.
    pub fn copy_from(&mut self, other: &ImageEncoder) {
        *self.dib_mut() = other.dib().clone();
    }

    /// Re-tag the record with `format`; no pixel data is recomputed.
    pub fn into_format(self, format: ImageFormat) -> ImageEncoder {
        let dib = self.into_dib();
        match format {
            ImageFormat::Bmp => ImageEncoder::Bmp(dib),
            ImageFormat::Png => ImageEncoder::Png(dib),
        }
    }

    #[inline]
    pub fn colors_in_palette(&self) -> usize {
        self.dib().colors_in_palette()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::StandardPngCodec;
    use pretty_assertions::assert_eq;

    fn indexed_sample() -> Bitmap {
        let mut bitmap = Bitmap::new(5, 3, PixelFormat::Indexed4);
        bitmap
            .set_palette(vec![Rgb::BLACK, Rgb::new(255, 0, 255), Rgb::new(0, 128, 0)])
            .unwrap();
        for y in 0..3 {
            for x in 0..5 {
                bitmap.set_index(x, y, ((x + y) % 3) as u8);
            }
        }
        bitmap
    }

    #[test]
    fn test_detect() {
        assert_eq!(
            ImageFormat::detect(&[40, 0, 0, 0, 1]).unwrap(),
            ImageFormat::Bmp
        );
        assert_eq!(
            ImageFormat::detect(&[0x89, b'P', b'N', b'G']).unwrap(),
            ImageFormat::Png
        );
        assert!(matches!(
            ImageFormat::detect(b"GIF8"),
            Err(IconError::InvalidFile(_))
        ));
        assert!(ImageFormat::detect(&[]).is_err());
    }

    #[test]
    fn test_header_fields() {
        let dib = DibImage::from_bitmap(
            &indexed_sample(),
            MaskSource::Derive(TransparentColor::Rgb(Rgb::new(255, 0, 255))),
        )
        .unwrap();
        let header = dib.header();
        assert_eq!(header.size, 40);
        assert_eq!(header.width, 5);
        assert_eq!(header.height, 6);
        assert_eq!(header.planes, 1);
        assert_eq!(header.bit_count, 4);
        assert_eq!(header.compression, 0);
        assert_eq!(header.clr_used, 16);
        assert_eq!(header.size_image, 12);
        assert_eq!(dib.and().len(), 12);
    }

    #[test]
    fn test_bmp_round_trip() {
        let dib = DibImage::from_bitmap(
            &indexed_sample(),
            MaskSource::Derive(TransparentColor::Rgb(Rgb::new(255, 0, 255))),
        )
        .unwrap();
        let encoder = ImageEncoder::Bmp(dib.clone());
        let codec = StandardPngCodec::default();
        let bytes = encoder.encode(&codec).unwrap();
        assert_eq!(bytes.len(), 40 + 16 * 4 + 12 + 12);
        assert_eq!(encoder.image_size(&codec).unwrap(), bytes.len());

        let parsed = ImageEncoder::read(&bytes, &codec).unwrap();
        assert_eq!(parsed, encoder);
    }

    #[test]
    fn test_bmp_header_is_checked_before_allocating() {
        let header_bytes = |header: BitmapInfoHeader| {
            let mut bytes = Vec::new();
            header.write(&mut bytes).unwrap();
            bytes.extend_from_slice(&[0u8; 64]);
            bytes
        };

        let huge = BitmapInfoHeader {
            width: 0x7FFF_FFFF,
            height: 0x7FFF_FFFE,
            ..BitmapInfoHeader::new(16, 16, 32, 0)
        };
        let err = DibImage::read_bmp(&header_bytes(huge)).unwrap_err();
        assert!(matches!(err, IconError::InvalidFile(_)));

        let empty = BitmapInfoHeader::new(0, 0, 32, 0);
        assert!(matches!(
            DibImage::read_bmp(&header_bytes(empty)),
            Err(IconError::InvalidFile(_))
        ));

        let wide_palette = BitmapInfoHeader::new(16, 16, 8, 0xFFFF_FFFF);
        assert!(matches!(
            DibImage::read_bmp(&header_bytes(wide_palette)),
            Err(IconError::InvalidFile(_))
        ));

        // plausible header, planes missing
        let short = BitmapInfoHeader::new(16, 16, 32, 0);
        let err = DibImage::read_bmp(&header_bytes(short)).unwrap_err();
        assert!(err.to_string().contains("header needs 1128"));

        assert!(matches!(
            DibImage::read_bmp(&[40, 0, 0, 0]),
            Err(IconError::InvalidFile(_))
        ));
    }

    #[test]
    fn test_set_xor_updates_size_image() {
        let mut dib = DibImage::from_bitmap(
            &Bitmap::new(2, 2, PixelFormat::Bgra32),
            MaskSource::Derive(TransparentColor::Alpha),
        )
        .unwrap();
        dib.set_xor(vec![0; 3]);
        assert_eq!(dib.header().size_image, 3);
    }

    #[test]
    fn test_planes_are_bottom_up() {
        let rgba = [
            255, 0, 0, 255, //
            0, 0, 255, 0,
        ];
        let bitmap = Bitmap::from_rgba(1, 2, &rgba).unwrap();
        let dib =
            DibImage::from_bitmap(&bitmap, MaskSource::Derive(TransparentColor::Alpha)).unwrap();
        // first stored row is the bottom (blue, transparent) pixel
        assert_eq!(&dib.xor()[..4], &[255, 0, 0, 0]);
        assert_eq!(dib.and(), &[0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(dib.to_rgba().unwrap(), rgba.to_vec());
    }

    #[test]
    fn test_to_rgba_hides_masked_indexed_pixels() {
        let dib = DibImage::from_bitmap(
            &indexed_sample(),
            MaskSource::Derive(TransparentColor::Rgb(Rgb::new(255, 0, 255))),
        )
        .unwrap();
        let rgba = dib.to_rgba().unwrap();
        // (1, 0) held the magenta index
        assert_eq!(&rgba[4..8], &[0, 0, 0, 0]);
        // (0, 0) is black and opaque
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        // (2, 0) is green
        assert_eq!(&rgba[8..12], &[0, 128, 0, 255]);
    }

    #[test]
    fn test_png_read_derives_alpha_mask() {
        let codec = StandardPngCodec::default();
        let rgba = [
            10, 20, 30, 255, //
            0, 0, 0, 0,
        ];
        let bytes = codec.encode(&rgba, 2, 1).unwrap();
        let encoder = ImageEncoder::read(&bytes, &codec).unwrap();
        assert_eq!(encoder.format(), ImageFormat::Png);
        assert_eq!(encoder.dib().bit_count(), 32);
        assert_eq!(encoder.dib().and(), &[0x40, 0, 0, 0]);

        let rewritten = encoder.encode(&codec).unwrap();
        assert_eq!(codec.decode(&rewritten).unwrap().rgba, rgba.to_vec());
    }

    #[test]
    fn test_copy_from_is_verbatim() {
        let source = ImageEncoder::Bmp(
            DibImage::from_bitmap(
                &indexed_sample(),
                MaskSource::Derive(TransparentColor::Alpha),
            )
            .unwrap(),
        );
        let mut target = ImageEncoder::Png(
            DibImage::from_bitmap(
                &Bitmap::new(1, 1, PixelFormat::Bgra32),
                MaskSource::Derive(TransparentColor::Alpha),
            )
            .unwrap(),
        );
        target.copy_from(&source);
        assert_eq!(target.format(), ImageFormat::Png);
        assert_eq!(target.dib(), source.dib());
        assert_eq!(source.clone().into_format(ImageFormat::Png), target);
    }
}
