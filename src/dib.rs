//! Little-endian on-disk structures of icon files and DIB resources.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use octree_quant::Rgb;
use serde::Serialize;

pub const BITMAPINFOHEADER_SIZE: usize = 40;
pub const RGBQUAD_SIZE: usize = 4;
pub const ICONDIR_SIZE: usize = 6;
pub const ICONDIRENTRY_SIZE: usize = 16;
pub const GRPICONDIRENTRY_SIZE: usize = 14;

/// `BITMAPINFOHEADER` as stored in an icon resource.
///
/// `height` covers both planes, so it is twice the image height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BitmapInfoHeader {
    pub size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bit_count: u16,
    pub compression: u32,
    pub size_image: u32,
    pub x_pels_per_meter: i32,
    pub y_pels_per_meter: i32,
    pub clr_used: u32,
    pub clr_important: u32,
}

impl BitmapInfoHeader {
    /// Header for an uncompressed `width` x `height` image.
    pub fn new(width: u32, height: u32, bit_count: u16, clr_used: u32) -> Self {
        Self {
            size: BITMAPINFOHEADER_SIZE as u32,
            width: width as i32,
            height: (height * 2) as i32,
            planes: 1,
            bit_count,
            compression: 0,
            size_image: 0,
            x_pels_per_meter: 0,
            y_pels_per_meter: 0,
            clr_used,
            clr_important: 0,
        }
    }

    #[inline]
    pub fn image_width(&self) -> u32 {
        self.width.unsigned_abs()
    }

    /// Height of one plane.
    #[inline]
    pub fn image_height(&self) -> u32 {
        self.height.unsigned_abs() / 2
    }

    /// Palette entries that follow the header.
    pub fn colors_in_palette(&self) -> usize {
        if self.clr_used != 0 {
            self.clr_used as usize
        } else if self.bit_count <= 8 {
            1 << self.bit_count
        } else {
            0
        }
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            size: reader.read_u32::<LittleEndian>()?,
            width: reader.read_i32::<LittleEndian>()?,
            height: reader.read_i32::<LittleEndian>()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bit_count: reader.read_u16::<LittleEndian>()?,
            compression: reader.read_u32::<LittleEndian>()?,
            size_image: reader.read_u32::<LittleEndian>()?,
            x_pels_per_meter: reader.read_i32::<LittleEndian>()?,
            y_pels_per_meter: reader.read_i32::<LittleEndian>()?,
            clr_used: reader.read_u32::<LittleEndian>()?,
            clr_important: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.size)?;
        writer.write_i32::<LittleEndian>(self.width)?;
        writer.write_i32::<LittleEndian>(self.height)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bit_count)?;
        writer.write_u32::<LittleEndian>(self.compression)?;
        writer.write_u32::<LittleEndian>(self.size_image)?;
        writer.write_i32::<LittleEndian>(self.x_pels_per_meter)?;
        writer.write_i32::<LittleEndian>(self.y_pels_per_meter)?;
        writer.write_u32::<LittleEndian>(self.clr_used)?;
        writer.write_u32::<LittleEndian>(self.clr_important)?;
        Ok(())
    }
}

/// `RGBQUAD` palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbQuad {
    pub blue: u8,
    pub green: u8,
    pub red: u8,
    pub reserved: u8,
}

impl RgbQuad {
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut raw = [0u8; RGBQUAD_SIZE];
        reader.read_exact(&mut raw)?;
        Ok(Self {
            blue: raw[0],
            green: raw[1],
            red: raw[2],
            reserved: raw[3],
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&[self.blue, self.green, self.red, self.reserved])
    }
}

impl From<Rgb> for RgbQuad {
    fn from(rgb: Rgb) -> Self {
        Self {
            blue: rgb.b,
            green: rgb.g,
            red: rgb.r,
            reserved: 0,
        }
    }
}

impl From<RgbQuad> for Rgb {
    fn from(quad: RgbQuad) -> Self {
        Rgb::new(quad.red, quad.green, quad.blue)
    }
}

/// `ICONDIR`, the file header of an `.ico`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconDir {
    pub reserved: u16,
    pub kind: u16,
    pub count: u16,
}

impl IconDir {
    pub const ICON: u16 = 1;

    pub fn new(count: u16) -> Self {
        Self {
            reserved: 0,
            kind: Self::ICON,
            count,
        }
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            reserved: reader.read_u16::<LittleEndian>()?,
            kind: reader.read_u16::<LittleEndian>()?,
            count: reader.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u16::<LittleEndian>(self.reserved)?;
        writer.write_u16::<LittleEndian>(self.kind)?;
        writer.write_u16::<LittleEndian>(self.count)?;
        Ok(())
    }
}

/// `ICONDIRENTRY`: one image in an `.ico` file. A 256 pixel side is stored
/// as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IconDirEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub reserved: u8,
    pub planes: u16,
    pub bit_count: u16,
    pub bytes_in_res: u32,
    pub image_offset: u32,
}

impl IconDirEntry {
    /// Decoded width (0 means 256).
    pub fn image_width(&self) -> u32 {
        dimension(self.width)
    }

    pub fn image_height(&self) -> u32 {
        dimension(self.height)
    }

    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            width: reader.read_u8()?,
            height: reader.read_u8()?,
            color_count: reader.read_u8()?,
            reserved: reader.read_u8()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bit_count: reader.read_u16::<LittleEndian>()?,
            bytes_in_res: reader.read_u32::<LittleEndian>()?,
            image_offset: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self.width)?;
        writer.write_u8(self.height)?;
        writer.write_u8(self.color_count)?;
        writer.write_u8(self.reserved)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bit_count)?;
        writer.write_u32::<LittleEndian>(self.bytes_in_res)?;
        writer.write_u32::<LittleEndian>(self.image_offset)?;
        Ok(())
    }
}

/// `GRPICONDIRENTRY`: the resource-section flavor of [`IconDirEntry`], with
/// a resource id in place of the file offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GrpIconDirEntry {
    pub width: u8,
    pub height: u8,
    pub color_count: u8,
    pub reserved: u8,
    pub planes: u16,
    pub bit_count: u16,
    pub bytes_in_res: u32,
    pub id: u16,
}

impl GrpIconDirEntry {
    pub fn read<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            width: reader.read_u8()?,
            height: reader.read_u8()?,
            color_count: reader.read_u8()?,
            reserved: reader.read_u8()?,
            planes: reader.read_u16::<LittleEndian>()?,
            bit_count: reader.read_u16::<LittleEndian>()?,
            bytes_in_res: reader.read_u32::<LittleEndian>()?,
            id: reader.read_u16::<LittleEndian>()?,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(self.width)?;
        writer.write_u8(self.height)?;
        writer.write_u8(self.color_count)?;
        writer.write_u8(self.reserved)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bit_count)?;
        writer.write_u32::<LittleEndian>(self.bytes_in_res)?;
        writer.write_u16::<LittleEndian>(self.id)?;
        Ok(())
    }
}

fn dimension(stored: u8) -> u32 {
    if stored == 0 {
        256
    } else {
        stored as u32
    }
}

/// Encode a pixel dimension for a directory entry (256 becomes 0).
pub(crate) fn stored_dimension(value: u32) -> u8 {
    if value >= 256 {
        0
    } else {
        value as u8
    }
}
