//! Cached nearest-color mapping.

use std::collections::HashMap;

use super::Palette;
use crate::bitmap::Sample;
use crate::color::Rgb;

/// Source-color to palette-index memo for a single conversion.
///
/// Keys are [`Sample::key`] values, so a cache must not be reused across
/// source formats or palettes.
#[derive(Debug, Default)]
pub struct ColorCache {
    entries: HashMap<u32, u8>,
}

impl ColorCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps colors onto a fixed palette by squared Euclidean distance.
#[derive(Debug, Clone, Copy)]
pub struct NearestColorMapper<'a> {
    palette: &'a Palette,
}

impl<'a> NearestColorMapper<'a> {
    pub fn new(palette: &'a Palette) -> Self {
        Self { palette }
    }

    #[inline]
    pub fn palette(&self) -> &'a Palette {
        self.palette
    }

    /// Uncached lookup.
    #[inline]
    pub fn nearest(&self, rgb: Rgb) -> u8 {
        self.palette.find_nearest(rgb)
    }

    /// Lookup through `cache`, searching the palette only on a miss.
    pub fn map(&self, cache: &mut ColorCache, sample: Sample) -> u8 {
        *cache
            .entries
            .entry(sample.key)
            .or_insert_with(|| self.palette.find_nearest(sample.rgb))
    }
}
