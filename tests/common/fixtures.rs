//! Test fixtures: synthetic source images.

use octree_quant::Bitmap;

/// Colors used by the fixtures
pub mod colors {
    pub const RED: [u8; 4] = [255, 0, 0, 255];
    pub const CLEAR: [u8; 4] = [0, 0, 0, 0];
}

/// Build a 32 bpp bitmap from a per-pixel RGBA function
pub fn argb(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 4]) -> Bitmap {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(&pixel(x, y));
        }
    }
    Bitmap::from_rgba(width, height, &rgba).unwrap()
}

/// 2x2: opaque red top-left, everything else fully transparent
pub fn red_corner() -> Bitmap {
    argb(2, 2, |x, y| {
        if x == 0 && y == 0 {
            colors::RED
        } else {
            colors::CLEAR
        }
    })
}

/// Opaque gradient disc on a transparent background, with a soft edge
pub fn gradient_disc(size: u32) -> Bitmap {
    let c = size as f32 / 2.0;
    argb(size, size, |x, y| {
        let dx = x as f32 + 0.5 - c;
        let dy = y as f32 + 0.5 - c;
        let d = (dx * dx + dy * dy).sqrt() / c;
        let alpha = if d < 0.7 {
            255
        } else if d < 0.9 {
            ((0.9 - d) / 0.2 * 255.0) as u8
        } else {
            0
        };
        [
            (x * 255 / size.max(1)) as u8,
            (y * 255 / size.max(1)) as u8,
            160,
            alpha,
        ]
    })
}

/// Write a bitmap as a PNG file
pub fn write_png(path: &std::path::Path, bitmap: &Bitmap) {
    use iconforge::rendering::{PngCodec, StandardPngCodec};
    let png = StandardPngCodec::default()
        .encode(&bitmap.to_rgba(), bitmap.width(), bitmap.height())
        .unwrap();
    std::fs::write(path, png).unwrap();
}
