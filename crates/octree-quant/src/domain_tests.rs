//! Regression tests for palette construction and conversion.
//!
//! Each test names the failure it guards against.

#[cfg(test)]
mod domain_tests {
    use crate::bitmap::{Bitmap, PixelFormat};
    use crate::bits::IndexDepth;
    use crate::color::Rgb;
    use crate::octree::{OctreeColorTree, OctreeQuantizer, PaletteQuantizer};
    use crate::palette::{ColorCache, NearestColorMapper, Palette};
    use crate::quantize::EuclideanQuantizer;
    use pretty_assertions::assert_eq;

    fn noise(width: u32, height: u32, seed: u32) -> Bitmap {
        let mut state = seed;
        let rgba: Vec<u8> = (0..width * height)
            .flat_map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let [a, b, c, _] = state.to_le_bytes();
                [a, b, c, 255]
            })
            .collect();
        Bitmap::from_rgba(width, height, &rgba).unwrap()
    }

    // ========================================================================
    // Octree bookkeeping
    // ========================================================================

    /// If this breaks, the tracked leaf count has drifted from the tree or
    /// reduction is losing samples while folding children.
    #[test]
    fn test_reduction_keeps_every_pixel() {
        for (max, depth) in [(1, IndexDepth::Eight), (16, IndexDepth::Four), (200, IndexDepth::Eight)] {
            let image = noise(23, 17, max as u32);
            let mut tree = OctreeColorTree::new(depth);
            for y in 0..image.height() {
                for x in 0..image.width() {
                    tree.add_color(image.pixel(x, y));
                    while tree.leaf_count() > max && tree.reduce() {}
                }
            }
            let leaves = tree.leaves();
            assert!(tree.leaf_count() <= max);
            assert_eq!(leaves.len(), tree.leaf_count());
            assert_eq!(
                leaves.iter().map(|l| l.pixel_count).sum::<u64>(),
                (image.width() * image.height()) as u64
            );
        }
    }

    /// If this breaks, a single-color palette no longer averages the image:
    /// reduction is dropping clusters instead of merging them.
    #[test]
    fn test_single_color_palette_is_weighted_mean() {
        let colors = [
            (Rgb::new(255, 0, 0), 3),
            (Rgb::new(0, 255, 0), 1),
            (Rgb::new(0, 0, 255), 2),
            (Rgb::new(200, 200, 200), 1),
            (Rgb::new(10, 90, 30), 1),
        ];
        let mut rgba = Vec::new();
        for (rgb, count) in colors {
            for _ in 0..count {
                rgba.extend_from_slice(&[rgb.r, rgb.g, rgb.b, 255]);
            }
        }
        let image = Bitmap::from_rgba(8, 1, &rgba).unwrap();

        let palette = OctreeQuantizer.create_palette(&image, 1, 8).unwrap();
        assert_eq!(palette.used(), 1);
        // r: (765 + 200 + 10) / 8, g: (255 + 200 + 90) / 8, b: (510 + 200 + 30) / 8
        assert_eq!(palette.get(0), Some(Rgb::new(121, 68, 92)));
    }

    // ========================================================================
    // Nearest color
    // ========================================================================

    /// If this breaks, cached lookups disagree with a fresh search, which
    /// means keys collide or the cache outlived its palette.
    #[test]
    fn test_cached_mapping_matches_brute_force() {
        let image = noise(31, 9, 7);
        let palette = OctreeQuantizer.create_palette(&image, 16, 4).unwrap();
        let mapper = NearestColorMapper::new(&palette);
        let mut cache = ColorCache::new();

        for pass in 0..2 {
            for y in 0..image.height() {
                for x in 0..image.width() {
                    let sample = image.sample(x, y);
                    let brute = palette
                        .colors()
                        .iter()
                        .enumerate()
                        .min_by_key(|(i, c)| (sample.rgb.distance_sq(**c), *i))
                        .map(|(i, _)| i as u8)
                        .unwrap();
                    assert_eq!(mapper.map(&mut cache, sample), brute, "pass {pass}");
                }
            }
        }
    }

    /// If this breaks, the monochrome path stopped using the fixed palette.
    #[test]
    fn test_black_and_white_source_maps_to_zero_and_one() {
        let rgba = [
            0, 0, 0, 255, //
            255, 255, 255, 255, //
            255, 255, 255, 255, //
            0, 0, 0, 255,
        ];
        let image = Bitmap::from_rgba(2, 2, &rgba).unwrap();
        let output = EuclideanQuantizer::new()
            .convert(&image, PixelFormat::Indexed1)
            .unwrap();

        assert_eq!(output.palette(), Palette::black_and_white().colors());
        assert_eq!(output.index(0, 0), Some(0));
        assert_eq!(output.index(1, 0), Some(1));
        assert_eq!(output.index(0, 1), Some(1));
        assert_eq!(output.index(1, 1), Some(0));
        assert_eq!(output.row(0)[0], 0b0100_0000);
        assert_eq!(output.row(1)[0], 0b1000_0000);
    }

    // ========================================================================
    // 16 bpp sources
    // ========================================================================

    /// If this breaks, 5-5-5 channels are no longer widened before the
    /// palette search (a full-intensity channel would read as 31).
    #[test]
    fn test_rgb555_source_quantizes_by_widened_channels() {
        let mut image = Bitmap::new(2, 1, PixelFormat::Rgb555);
        image.set_pixel(0, 0, Rgb::new(255, 0, 0));
        image.set_pixel(1, 0, Rgb::new(0, 0, 255));

        let output = EuclideanQuantizer::without_dithering()
            .convert(&image, PixelFormat::Indexed4)
            .unwrap();
        assert_eq!(output.pixel(0, 0), Rgb::new(0xF8, 0, 0));
        assert_eq!(output.pixel(1, 0), Rgb::new(0, 0, 0xF8));
    }
}
