//! Pixel-level collaborators: PNG coding and resampling.

mod png_codec;
mod resample;

pub use png_codec::{DecodedPng, PngCodec, StandardPngCodec};
pub use resample::{LanczosResampler, Resampler};
