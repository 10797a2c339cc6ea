use super::histogram::{unpack_key, BitDepth, Histogram};
use serde::{Deserialize, Serialize};

/// Default visibility cut-off, in percent of all pixels.
pub const THRESHOLD_PERCENT: f32 = 1.0;

/// A representative colour and its share of the image, in tenths of a percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Swatch {
    /// Opaque `0xAARRGGBB`.
    pub color: u32,
    pub percent_times10: u32,
}

impl Swatch {
    pub fn from_rgb(r: u8, g: u8, b: u8, percent_times10: u32) -> Self {
        Self {
            color: argb(r, g, b),
            percent_times10,
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.color >> 16) & 0xFF) as u8,
            ((self.color >> 8) & 0xFF) as u8,
            (self.color & 0xFF) as u8,
        )
    }

    pub fn hex(self) -> String {
        format!("#{:06X}", self.color & 0x00FF_FFFF)
    }

    pub fn percent(self) -> f32 {
        self.percent_times10 as f32 / 10.0
    }
}

fn argb(r: u8, g: u8, b: u8) -> u32 {
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

/// Maps a bucket back onto the full 0..=255 range, `level * 255 / (2^B - 1)`.
pub fn dequantize(key: u32, depth: BitDepth) -> u32 {
    let max = depth.max_level();
    let [r, g, b] = unpack_key(key, depth).map(|level| (level * 255 / max) as u8);
    argb(r, g, b)
}

/// `round(count * 1000 / total)` in integer arithmetic, halves rounding up.
pub fn percent_times10(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count * 2000 + total) / (2 * total)) as u32
}

/// Smallest `percent_times10` that still satisfies `p / 10 >= threshold`.
pub fn threshold_times10(threshold_percent: f32) -> u32 {
    let t = threshold_percent as f64 * 10.0;
    // Absorbs binary noise such as 0.3 * 10 = 3.0000000000000004.
    (t - 1e-6).ceil().max(0.0) as u32
}

/// Ranks the histogram into swatches, heaviest first.
///
/// Buckets under `threshold_percent` are dropped outright; their mass is not
/// folded into any catch-all entry. Equal weights keep ascending bucket-key
/// order, so the output is fully determined by the histogram.
pub fn resolve(hist: &Histogram, threshold_percent: f32) -> Vec<Swatch> {
    let total = hist.total();
    if total == 0 {
        return Vec::new();
    }

    let depth = hist.depth();
    let min_times10 = threshold_times10(threshold_percent);

    let mut swatches: Vec<Swatch> = hist
        .iter()
        .map(|(key, count)| Swatch {
            color: dequantize(key, depth),
            percent_times10: percent_times10(count, total),
        })
        .collect();

    // stable: ties stay in key order
    swatches.sort_by(|a, b| b.percent_times10.cmp(&a.percent_times10));
    swatches.retain(|s| s.percent_times10 >= min_times10);
    swatches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::histogram::bucket_key;
    use image::{Rgb, RgbImage};

    fn d4() -> BitDepth {
        BitDepth::new(4).unwrap()
    }

    #[test]
    fn test_dequantize_extremes() {
        assert_eq!(dequantize(0xF00, d4()), 0xFFFF_0000);
        assert_eq!(dequantize(0x000, d4()), 0xFF00_0000);
        assert_eq!(dequantize(0xFFF, d4()), 0xFFFF_FFFF);
    }

    #[test]
    fn test_dequantize_error_is_bounded() {
        for bits in 1..=7u8 {
            let d = BitDepth::new(bits).unwrap();
            let bound = 255 / d.max_level() as i32;
            for v in 0..=255u8 {
                let key = bucket_key([v, v, v], d);
                let (r, _, _) = Swatch { color: dequantize(key, d), percent_times10: 0 }.rgb();
                let err = (r as i32 - v as i32).abs();
                assert!(err <= bound, "bits={bits} v={v} got={r}");
            }
        }
    }

    #[test]
    fn test_percent_times10_rounds_half_up() {
        assert_eq!(percent_times10(1, 2000), 1); // 0.5 -> 1
        assert_eq!(percent_times10(1, 3), 333);
        assert_eq!(percent_times10(2, 3), 667);
        assert_eq!(percent_times10(7, 7), 1000);
        assert_eq!(percent_times10(3, 0), 0);
    }

    #[test]
    fn test_threshold_times10() {
        assert_eq!(threshold_times10(1.0), 10);
        assert_eq!(threshold_times10(0.3), 3);
        assert_eq!(threshold_times10(1.05), 11);
        assert_eq!(threshold_times10(0.0), 0);
    }

    #[test]
    fn test_solid_red_single_swatch() {
        let img = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));
        let swatches = resolve(&Histogram::from_image(&img, d4()), 1.0);
        assert_eq!(swatches.len(), 1);
        assert_eq!(swatches[0].percent_times10, 1000);
        assert_eq!(swatches[0].rgb(), (255, 0, 0));
        assert_eq!(swatches[0].hex(), "#FF0000");
    }

    #[test]
    fn test_half_white_half_black_ties_follow_key_order() {
        let img = RgbImage::from_fn(10, 10, |_, y| if y < 5 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) });
        let hist = Histogram::from_image(&img, d4());
        assert_eq!(hist.count(0xFFF), 50);
        assert_eq!(hist.count(0x000), 50);

        let swatches = resolve(&hist, 1.0);
        assert_eq!(swatches.len(), 2);
        assert!(swatches.iter().all(|s| s.percent_times10 == 500));
        assert_eq!(swatches[0].rgb(), (0, 0, 0));
        assert_eq!(swatches[1].rgb(), (255, 255, 255));
    }

    #[test]
    fn test_minor_colour_is_filtered_out() {
        // 1 blue pixel out of 200 = 0.5%
        let img = RgbImage::from_fn(20, 10, |x, y| if x == 0 && y == 0 { Rgb([0, 0, 255]) } else { Rgb([0, 200, 0]) });
        let hist = Histogram::from_image(&img, d4());
        assert_eq!(hist.count(bucket_key([0, 0, 255], d4())), 1);

        let swatches = resolve(&hist, 1.0);
        assert_eq!(swatches.len(), 1);
        let retained: u32 = swatches.iter().map(|s| s.percent_times10).sum();
        assert_eq!(retained, 995);
    }

    #[test]
    fn test_sorted_descending_and_bounded() {
        let img = RgbImage::from_fn(40, 25, |x, _| Rgb([(x * 6) as u8, 90, (255 - x * 6) as u8]));
        let swatches = resolve(&Histogram::from_image(&img, d4()), 1.0);
        assert!(!swatches.is_empty());
        assert!(swatches.windows(2).all(|w| w[0].percent_times10 >= w[1].percent_times10));
        let retained: u32 = swatches.iter().map(|s| s.percent_times10).sum();
        assert!(retained <= 1000);
    }

    #[test]
    fn test_everything_below_threshold_is_empty() {
        let img = RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 0]));
        // 256 distinct buckets at ~0.4% each
        assert!(resolve(&Histogram::from_image(&img, d4()), 1.0).is_empty());
    }

    #[test]
    fn test_empty_histogram_yields_nothing() {
        let hist = Histogram::new(d4());
        assert!(resolve(&hist, 0.0).is_empty());
    }
}
