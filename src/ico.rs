//! `.ico` file layout: `ICONDIR`, one `ICONDIRENTRY` per image, then the
//! image resources.

use std::io::{self, Cursor, Write};

use tracing::debug;

use crate::dib::{IconDir, IconDirEntry, ICONDIRENTRY_SIZE, ICONDIR_SIZE};
use crate::error::IconError;
use crate::icon::IconImage;
use crate::rendering::PngCodec;

pub struct IcoCodec;

impl IcoCodec {
    /// Parse every image of an `.ico` file, in directory order.
    ///
    /// # Errors
    ///
    /// [`IconError::InvalidFile`] for a directory type other than icon, or
    /// a directory or resource that runs past the end of `bytes`.
    pub fn read(bytes: &[u8], codec: &dyn PngCodec) -> Result<Vec<IconImage>, IconError> {
        let mut cursor = Cursor::new(bytes);
        let dir = IconDir::read(&mut cursor).map_err(truncated)?;
        if dir.reserved != 0 || dir.kind != IconDir::ICON {
            return Err(IconError::InvalidFile(format!(
                "not an icon directory (reserved {}, type {})",
                dir.reserved, dir.kind
            )));
        }

        let mut entries = Vec::with_capacity(dir.count as usize);
        for _ in 0..dir.count {
            entries.push(IconDirEntry::read(&mut cursor).map_err(truncated)?);
        }

        let mut images = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let start = entry.image_offset as usize;
            let end = start.checked_add(entry.bytes_in_res as usize);
            let resource = match end {
                Some(end) if end <= bytes.len() => &bytes[start..end],
                _ => {
                    return Err(IconError::InvalidFile(format!(
                        "image {i} ({} bytes at offset {start}) runs past end of file ({} bytes)",
                        entry.bytes_in_res,
                        bytes.len()
                    )))
                }
            };
            let image = IconImage::read(resource, codec).map_err(|e| match e {
                IconError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    IconError::InvalidFile(format!("image {i} is truncated"))
                }
                other => other,
            })?;
            images.push(image);
        }

        debug!(images = images.len(), bytes = bytes.len(), "Read icon file");
        Ok(images)
    }

    /// Write `images` as an `.ico` file. Each resource is encoded once and
    /// laid out right after the directory, in order.
    pub fn write<W: Write>(
        writer: &mut W,
        images: &[IconImage],
        codec: &dyn PngCodec,
    ) -> Result<(), IconError> {
        let count = u16::try_from(images.len()).map_err(|_| {
            IconError::InvalidFile(format!("{} images do not fit in one icon", images.len()))
        })?;

        let resources = images
            .iter()
            .map(|image| image.encoder().encode(codec))
            .collect::<Result<Vec<_>, _>>()?;

        IconDir::new(count).write(writer)?;
        let mut offset = ICONDIR_SIZE + ICONDIRENTRY_SIZE * images.len();
        for (image, resource) in images.iter().zip(&resources) {
            let entry = IconDirEntry {
                bytes_in_res: resource.len() as u32,
                image_offset: offset as u32,
                ..image.dir_entry()
            };
            entry.write(writer)?;
            offset += resource.len();
        }
        for resource in &resources {
            writer.write_all(resource)?;
        }

        debug!(images = images.len(), bytes = offset, "Wrote icon file");
        Ok(())
    }

    pub fn to_bytes(images: &[IconImage], codec: &dyn PngCodec) -> Result<Vec<u8>, IconError> {
        let mut buf = Vec::new();
        Self::write(&mut buf, images, codec)?;
        Ok(buf)
    }
}

fn truncated(e: io::Error) -> IconError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        IconError::InvalidFile("icon directory is truncated".to_string())
    } else {
        IconError::Io(e)
    }
}
