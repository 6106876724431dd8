//! Assertion helpers for tests.

use iconforge::icon::{IconImage, SingleIcon};
use pretty_assertions::assert_eq;

/// Assert the icon holds exactly these (size, bpp) pairs, in order
pub fn assert_layout(icon: &SingleIcon, expected: &[(u32, u16)]) {
    let got: Vec<(u32, u16)> = icon.iter().map(|i| (i.width(), i.bit_count())).collect();
    assert_eq!(got, expected, "Unexpected icon layout");
}

/// Assert a mask pixel is set (hidden) or clear. `y` is top-down.
pub fn assert_mask_bit(image: &IconImage, x: u32, y: u32, hidden: bool) {
    let stride = (((image.width() + 31) & !31) >> 3) as usize;
    let row = (image.height() - 1 - y) as usize;
    let byte = image.and()[row * stride + (x / 8) as usize];
    let bit = byte & (0x80 >> (x & 7)) != 0;
    assert_eq!(
        bit,
        hidden,
        "Mask bit at ({x}, {y}) of {}x{}@{}",
        image.width(),
        image.height(),
        image.bit_count()
    );
}

/// Assert two images carry byte-identical AND planes
pub fn assert_same_mask(a: &IconImage, b: &IconImage) {
    assert_eq!(
        a.and(),
        b.and(),
        "AND planes differ between {}bpp and {}bpp",
        a.bit_count(),
        b.bit_count()
    );
}
