use super::downsample::{load_downsampled, ImageSource, MAX_DIMENSION};
use super::error::PaletteError;
use super::histogram::{BitDepth, Histogram};
use super::swatch::{resolve, Swatch, THRESHOLD_PERCENT};
use image::RgbImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub max_dimension: u32,
    pub bits_per_channel: u8,
    pub threshold_percent: f32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            bits_per_channel: BitDepth::DEFAULT.bits(),
            threshold_percent: THRESHOLD_PERCENT,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<BitDepth, PaletteError> {
        if self.max_dimension == 0 {
            return Err(PaletteError::InvalidMaxDimension);
        }
        let t = self.threshold_percent;
        if !t.is_finite() || !(0.0..=100.0).contains(&t) {
            return Err(PaletteError::InvalidThreshold(t));
        }
        BitDepth::new(self.bits_per_channel)
    }
}

/// Result of one analysis. A failed decode is not an error at this level: the
/// swatch list is simply empty and `failure` says why.
#[derive(Debug, Default)]
pub struct Extraction {
    pub swatches: Vec<Swatch>,
    /// Size of the pixel buffer that was actually scanned.
    pub dimensions: Option<(u32, u32)>,
    /// Occupied buckets before thresholding.
    pub buckets: usize,
    pub failure: Option<PaletteError>,
}

impl Extraction {
    fn failed(err: PaletteError) -> Self {
        Self {
            failure: Some(err),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    pub fn retained_times10(&self) -> u32 {
        self.swatches.iter().map(|s| s.percent_times10).sum()
    }

    /// Share of the image that fell under the threshold, in tenths of a percent.
    pub fn discarded_times10(&self) -> u32 {
        if self.dimensions.is_none() {
            return 0;
        }
        1000u32.saturating_sub(self.retained_times10())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaletteExtractor {
    config: ExtractorConfig,
}

impl PaletteExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Decode, bucket and rank. Never panics and never returns an error.
    pub fn extract(&self, source: &ImageSource) -> Extraction {
        let depth = match self.config.validate() {
            Ok(d) => d,
            Err(e) => return Extraction::failed(e),
        };

        let img = match load_downsampled(source, self.config.max_dimension) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("palette extraction skipped for {source}: {e}");
                return Extraction::failed(e);
            }
        };

        self.extract_pixels(&img, depth)
    }

    /// Runs the histogram and ranking stages on an already decoded buffer.
    pub fn extract_image(&self, img: &RgbImage) -> Extraction {
        match self.config.validate() {
            Ok(depth) => self.extract_pixels(img, depth),
            Err(e) => Extraction::failed(e),
        }
    }

    fn extract_pixels(&self, img: &RgbImage, depth: BitDepth) -> Extraction {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Extraction::failed(PaletteError::EmptyInput { width, height });
        }

        let hist = Histogram::from_image(img, depth);
        let swatches = resolve(&hist, self.config.threshold_percent);
        log::debug!(
            "{}x{} px -> {} buckets -> {} swatches",
            width,
            height,
            hist.len(),
            swatches.len()
        );

        Extraction {
            swatches,
            dimensions: Some((width, height)),
            buckets: hist.len(),
            failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_default_config_matches_constants() {
        let cfg = ExtractorConfig::default();
        assert_eq!(cfg.max_dimension, 300);
        assert_eq!(cfg.bits_per_channel, 4);
        assert_eq!(cfg.threshold_percent, 1.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_is_reported_not_panicked() {
        let ex = PaletteExtractor::new(ExtractorConfig {
            bits_per_channel: 9,
            ..Default::default()
        });
        let out = ex.extract_image(&RgbImage::from_pixel(4, 4, Rgb([1, 1, 1])));
        assert!(out.is_empty());
        assert!(matches!(out.failure, Some(PaletteError::InvalidBitDepth(9))));

        let bad_threshold = ExtractorConfig {
            threshold_percent: f32::NAN,
            ..Default::default()
        };
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn test_zero_sized_buffer_is_empty_input() {
        let out = PaletteExtractor::default().extract_image(&RgbImage::new(0, 0));
        assert!(out.is_empty());
        assert!(matches!(out.failure, Some(PaletteError::EmptyInput { .. })));
        assert_eq!(out.discarded_times10(), 0);
    }

    #[test]
    fn test_extract_image_reports_discarded_mass() {
        let img = RgbImage::from_fn(20, 10, |x, y| if x == 0 && y == 0 { Rgb([0, 0, 255]) } else { Rgb([250, 250, 0]) });
        let out = PaletteExtractor::default().extract_image(&img);
        assert_eq!(out.dimensions, Some((20, 10)));
        assert_eq!(out.buckets, 2);
        assert_eq!(out.retained_times10(), 995);
        assert_eq!(out.discarded_times10(), 5);
    }

    #[test]
    fn test_malformed_bytes_yield_decode_failure() {
        let out = PaletteExtractor::default().extract(&ImageSource::Bytes(vec![0x89, b'P', b'N', b'G', 0, 1, 2]));
        assert!(out.is_empty());
        assert!(out.failure.as_ref().is_some_and(PaletteError::is_decode_failure));
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let img = RgbImage::from_fn(30, 30, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8]));
        let ex = PaletteExtractor::new(ExtractorConfig {
            threshold_percent: 0.5,
            ..Default::default()
        });
        assert_eq!(ex.extract_image(&img).swatches, ex.extract_image(&img).swatches);
    }
}
