//! Palettes and nearest-color lookup.
//!
//! A [`Palette`] is the immutable output of palette construction; the
//! [`NearestColorMapper`] maps source colors onto it, memoizing results in a
//! [`ColorCache`] that the caller owns for the duration of one conversion.

mod nearest;
#[allow(clippy::module_inception)]
mod palette;

pub use nearest::{ColorCache, NearestColorMapper};
pub use palette::Palette;
