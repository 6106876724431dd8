//! octree-quant: palette reduction for legacy indexed bitmaps
//!
//! This crate turns 16, 24 and 32 bpp rasters into 1, 4 and 8 bpp indexed
//! rasters the way classic icon and DIB tooling expects them: an adaptive
//! octree palette, squared-Euclidean nearest-color mapping with a per-call
//! cache, and optional Floyd-Steinberg error diffusion.
//!
//! # Quick Start
//!
//! ```
//! use octree_quant::{Bitmap, EuclideanQuantizer, PixelFormat};
//!
//! let rgba: Vec<u8> = (0..16u8).flat_map(|v| [v * 16, 255 - v * 16, 128, 255]).collect();
//! let source = Bitmap::from_rgba(4, 4, &rgba).unwrap();
//!
//! let indexed = EuclideanQuantizer::new()
//!     .convert(&source, PixelFormat::Indexed4)
//!     .unwrap();
//! assert_eq!(indexed.palette().len(), 16);
//! ```
//!
//! # Pieces
//!
//! - [`OctreeColorTree`]: the clustering structure, usable on its own
//! - [`OctreeQuantizer`]: builds a [`Palette`] from a [`Bitmap`]
//! - [`NearestColorMapper`] and [`ColorCache`]: palette lookup
//! - [`Ditherer`], [`FloydSteinberg`], [`KernelDitherer`]: error diffusion
//! - [`BitPacker`]: 1/4/8 bpp index packing, MSB first
//! - [`EuclideanQuantizer`]: the whole pipeline
//!
//! # Row order
//!
//! [`Bitmap`] rows are top-down. Conversion walks rows top to bottom and
//! pixels left to right; dithering depends on that order.

pub mod bitmap;
pub mod bits;
pub mod color;
pub mod dither;
pub mod error;
pub mod octree;
pub mod palette;
pub mod quantize;

#[cfg(test)]
mod domain_tests;

pub use bitmap::{Bitmap, PixelFormat, Sample};
pub use bits::{stride, BitPacker, IndexDepth};
pub use color::{ChannelMask, Rgb};
pub use dither::{Ditherer, FloydSteinberg, Kernel, KernelDitherer, FLOYD_STEINBERG};
pub use error::QuantizeError;
pub use octree::{LeafSummary, OctreeColorTree, OctreeQuantizer, PaletteQuantizer};
pub use palette::{ColorCache, NearestColorMapper, Palette};
pub use quantize::EuclideanQuantizer;
