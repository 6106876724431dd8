//! Iconforge - Windows icon synthesis
//!
//! Turns one 32-bit ARGB image into a multi-resolution `.ico`: resampled
//! per resolution, octree-quantized to 8, 4 and 1 bpp, with every depth of a
//! resolution sharing the same transparency mask.
//! This library exposes modules for integration testing.

pub mod dib;
pub mod encoder;
pub mod error;
pub mod ico;
pub mod icon;
pub mod models;
pub mod rendering;
pub mod synth;
pub mod transparency;
