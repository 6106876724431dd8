//! Error type for palette building and conversion.

use thiserror::Error;

/// Errors returned by palette construction and indexed conversion.
///
/// Every variant is a deterministic input-validation failure; retrying the
/// same call with the same input fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantizeError {
    /// The source bitmap is not stored at 16, 24 or 32 bits per pixel.
    #[error("unsupported source pixel format: {bits} bpp (expected 16, 24 or 32)")]
    UnsupportedPixelFormat { bits: u16 },

    /// The target indexed depth is not 1, 4 or 8 bits per pixel.
    #[error("unsupported indexed depth: {bits} bpp (expected 1, 4 or 8)")]
    UnsupportedDepth { bits: u16 },

    /// More palette entries were requested than the depth can address.
    #[error("palette size {requested} out of range, maximum {limit} colors")]
    PaletteSizeExceeded { requested: usize, limit: usize },

    /// A raw pixel buffer does not match `stride * height`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size_message() {
        let err = QuantizeError::PaletteSizeExceeded {
            requested: 20,
            limit: 16,
        };
        assert_eq!(
            err.to_string(),
            "palette size 20 out of range, maximum 16 colors"
        );
    }

    #[test]
    fn test_unsupported_depth_message() {
        let err = QuantizeError::UnsupportedDepth { bits: 2 };
        assert_eq!(
            err.to_string(),
            "unsupported indexed depth: 2 bpp (expected 1, 4 or 8)"
        );
    }
}
