use std::io::Cursor;

use crate::error::IconError;

/// Raw RGBA pixels of a decoded PNG, top-down, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPng {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Opaque PNG compression for icon sub-images.
pub trait PngCodec {
    fn encode(&self, rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, IconError>;
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPng, IconError>;
}

/// [`PngCodec`] backed by the `png` crate, with an optional `oxipng` pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPngCodec {
    optimize: bool,
}

impl StandardPngCodec {
    pub fn new(optimize: bool) -> Self {
        Self { optimize }
    }
}

impl PngCodec for StandardPngCodec {
    fn encode(&self, rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>, IconError> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            if self.optimize {
                // oxipng re-compresses anyway
                encoder.set_compression(png::Compression::Fast);
                encoder.set_filter(png::FilterType::NoFilter);
            }
            let mut writer = encoder.write_header()?;
            writer.write_image_data(rgba)?;
        }
        let png_bytes = buf.into_inner();
        if !self.optimize {
            return Ok(png_bytes);
        }

        match oxipng::optimize_from_memory(
            &png_bytes,
            &oxipng::Options {
                strip: oxipng::StripChunks::Safe,
                optimize_alpha: false,
                ..Default::default()
            },
        ) {
            Ok(optimized) => Ok(optimized),
            Err(e) => {
                tracing::warn!(%e, "PNG optimization failed, keeping unoptimized image");
                Ok(png_bytes)
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedPng, IconError> {
        let mut decoder = png::Decoder::new(Cursor::new(bytes));
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let data = &buf[..info.buffer_size()];

        let rgba = match info.color_type {
            png::ColorType::Rgba => data.to_vec(),
            png::ColorType::Rgb => data
                .chunks_exact(3)
                .flat_map(|px| [px[0], px[1], px[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => data
                .chunks_exact(2)
                .flat_map(|px| [px[0], px[0], px[0], px[1]])
                .collect(),
            png::ColorType::Grayscale => data.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(IconError::Png("indexed PNG was not expanded".to_string()))
            }
        };

        Ok(DecodedPng {
            rgba,
            width: info.width,
            height: info.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn checker() -> Vec<u8> {
        (0..9u8)
            .flat_map(|i| {
                if i % 2 == 0 {
                    [255, 0, 0, 255]
                } else {
                    [0, 0, 255, i * 20]
                }
            })
            .collect()
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let codec = StandardPngCodec::default();
        let bytes = codec.encode(&checker(), 3, 3).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (3, 3));
        assert_eq!(decoded.rgba, checker());
    }

    #[test]
    fn test_optimized_output_decodes_identically() {
        let codec = StandardPngCodec::new(true);
        let bytes = codec.encode(&checker(), 3, 3).unwrap();
        let decoded = StandardPngCodec::default().decode(&bytes).unwrap();
        assert_eq!(decoded.rgba, checker());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = StandardPngCodec::default()
            .decode(b"not a png at all")
            .unwrap_err();
        assert!(matches!(err, IconError::Png(_)));
    }
}
