//! Dominant-colour extraction: downsample, bucket, rank.

pub mod downsample;
pub mod error;
pub mod extract;
pub mod histogram;
pub mod swatch;

pub use downsample::ImageSource;
pub use error::PaletteError;
pub use extract::{Extraction, ExtractorConfig, PaletteExtractor};
pub use histogram::{BitDepth, Histogram};
pub use swatch::Swatch;
