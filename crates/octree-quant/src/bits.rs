//! Palette index packing for 1, 4 and 8 bpp rows.
//!
//! Pixels are packed MSB-first: at 4 bpp the even column lives in the high
//! nibble, at 1 bpp column `x` is bit `0x80 >> (x & 7)` of byte `x >> 3`.

/// Bit depth of an indexed pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexDepth {
    One,
    Four,
    Eight,
}

impl IndexDepth {
    /// Parse a bits-per-pixel count.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            1 => Some(IndexDepth::One),
            4 => Some(IndexDepth::Four),
            8 => Some(IndexDepth::Eight),
            _ => None,
        }
    }

    #[inline]
    pub fn bits(self) -> u16 {
        match self {
            IndexDepth::One => 1,
            IndexDepth::Four => 4,
            IndexDepth::Eight => 8,
        }
    }

    /// Number of addressable palette entries (`2^bits`).
    #[inline]
    pub fn max_colors(self) -> usize {
        1 << self.bits()
    }
}

/// Bytes per row for `width` pixels at `bits` per pixel, padded to 32 bits.
#[inline]
pub fn stride(width: u32, bits: u16) -> usize {
    ((width as usize * bits as usize + 31) & !31) >> 3
}

/// Writes and reads palette indices inside a packed row.
pub struct BitPacker;

impl BitPacker {
    /// Store `index` at column `x`, overwriting whatever was there.
    ///
    /// Index bits beyond the depth are discarded.
    ///
    /// # Panics
    ///
    /// Panics if the column lies outside `row`.
    #[inline]
    pub fn pack(row: &mut [u8], x: usize, depth: IndexDepth, index: u8) {
        match depth {
            IndexDepth::Eight => row[x] = index,
            IndexDepth::Four => {
                let byte = &mut row[x >> 1];
                if x & 1 == 0 {
                    *byte = (*byte & 0x0F) | (index << 4);
                } else {
                    *byte = (*byte & 0xF0) | (index & 0x0F);
                }
            }
            IndexDepth::One => {
                let bit = 0x80u8 >> (x & 7);
                let byte = &mut row[x >> 3];
                if index & 1 == 1 {
                    *byte |= bit;
                } else {
                    *byte &= !bit;
                }
            }
        }
    }

    /// Read the index stored at column `x`.
    ///
    /// # Panics
    ///
    /// Panics if the column lies outside `row`.
    #[inline]
    pub fn unpack(row: &[u8], x: usize, depth: IndexDepth) -> u8 {
        match depth {
            IndexDepth::Eight => row[x],
            IndexDepth::Four => {
                let byte = row[x >> 1];
                if x & 1 == 0 {
                    byte >> 4
                } else {
                    byte & 0x0F
                }
            }
            IndexDepth::One => (row[x >> 3] >> (7 - (x & 7))) & 1,
        }
    }
}
