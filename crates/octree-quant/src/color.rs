//! 8-bit RGB color and channel bit-field helpers.

/// An 8-bit-per-channel RGB color.
///
/// Alpha is deliberately absent: palettes, distance computation and error
/// diffusion all operate on the color channels only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into `0x00RRGGBB`.
    #[inline]
    pub const fn packed(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Squared Euclidean distance in RGB space.
    #[inline]
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// A color channel stored as a contiguous bit field inside a packed pixel.
///
/// The shift counts are derived from the mask: the right shift moves the
/// field down to bit 0 and the left shift widens it to 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask(pub u32);

impl ChannelMask {
    pub const RGB555_RED: ChannelMask = ChannelMask(0x7C00);
    pub const RGB555_GREEN: ChannelMask = ChannelMask(0x03E0);
    pub const RGB555_BLUE: ChannelMask = ChannelMask(0x001F);

    /// Position of the least significant set bit (0 for an empty mask).
    #[inline]
    pub const fn right_shift(self) -> u32 {
        if self.0 == 0 {
            0
        } else {
            self.0.trailing_zeros()
        }
    }

    /// Distance needed to scale the field up to 8 bits.
    #[inline]
    pub const fn left_shift(self) -> u32 {
        8u32.saturating_sub(self.0.count_ones())
    }

    /// Extract the channel from a packed pixel and widen it to 8 bits.
    #[inline]
    pub const fn extract(self, pixel: u32) -> u8 {
        (((pixel & self.0) >> self.right_shift()) << self.left_shift()) as u8
    }

    /// Narrow an 8-bit channel value and place it into the field.
    #[inline]
    pub const fn insert(self, value: u8) -> u32 {
        ((value as u32 >> self.left_shift()) << self.right_shift()) & self.0
    }
}
