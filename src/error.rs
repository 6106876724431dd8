use octree_quant::QuantizeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IconError {
    #[error("Unsupported pixel format: {bits} bpp")]
    UnsupportedPixelFormat { bits: u16 },

    #[error("Invalid pixel format: expected 32 bpp ARGB source, got {bits} bpp")]
    InvalidPixelFormat { bits: u16 },

    #[error("Image too large: {width}x{height} (max 256x256)")]
    ImageTooLarge { width: u32, height: u32 },

    #[error("Image {width}x{height} at {bits} bpp already exists")]
    DuplicateResolution { width: u32, height: u32, bits: u16 },

    #[error(
        "Mask size mismatch: expected {expected_width}x{expected_height} at 1 bpp, \
         got {width}x{height} at {bits} bpp"
    )]
    MaskSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
        bits: u16,
    },

    #[error("Transparency mask cannot be derived from a 16 bpp image")]
    Unsupported16bppMask,

    #[error("No icon selected")]
    InvalidContainerSelection,

    #[error("Icon name already exists: {0}")]
    IconNameAlreadyExists(String),

    #[error("Icon not found: {0}")]
    IconNameNotFound(String),

    #[error("Invalid icon file: {0}")]
    InvalidFile(String),

    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("PNG error: {0}")]
    Png(String),

    #[error("Quantize error: {0}")]
    Quantize(#[from] QuantizeError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<png::DecodingError> for IconError {
    fn from(e: png::DecodingError) -> Self {
        IconError::Png(e.to_string())
    }
}

impl From<png::EncodingError> for IconError {
    fn from(e: png::EncodingError) -> Self {
        IconError::Png(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_too_large() {
        let error = IconError::ImageTooLarge {
            width: 512,
            height: 300,
        };
        assert_eq!(error.to_string(), "Image too large: 512x300 (max 256x256)");
    }

    #[test]
    fn test_duplicate_resolution() {
        let error = IconError::DuplicateResolution {
            width: 32,
            height: 32,
            bits: 8,
        };
        assert_eq!(error.to_string(), "Image 32x32 at 8 bpp already exists");
    }

    #[test]
    fn test_mask_size_mismatch() {
        let error = IconError::MaskSizeMismatch {
            expected_width: 16,
            expected_height: 16,
            width: 16,
            height: 16,
            bits: 8,
        };
        assert_eq!(
            error.to_string(),
            "Mask size mismatch: expected 16x16 at 1 bpp, got 16x16 at 8 bpp"
        );
    }

    #[test]
    fn test_invalid_selection() {
        assert_eq!(
            IconError::InvalidContainerSelection.to_string(),
            "No icon selected"
        );
    }

    #[test]
    fn test_from_quantize_error() {
        let error: IconError = QuantizeError::UnsupportedDepth { bits: 2 }.into();
        match error {
            IconError::Quantize(QuantizeError::UnsupportedDepth { bits }) => assert_eq!(bits, 2),
            other => panic!("Expected Quantize variant, got {other:?}"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let error: IconError = io.into();
        assert_eq!(error.to_string(), "IO error: short read");
    }
}
