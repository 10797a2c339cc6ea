use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image has no pixels ({width}x{height})")]
    EmptyInput { width: u32, height: u32 },

    #[error("bits per channel must be in 1..=7, got {0}")]
    InvalidBitDepth(u8),

    #[error("threshold must be a finite percentage in 0..=100, got {0}")]
    InvalidThreshold(f32),

    #[error("unsupported pixel layout {0:?}")]
    UnsupportedColor(image::ColorType),

    #[error("max dimension must be positive")]
    InvalidMaxDimension,
}

impl PaletteError {
    /// True for failures that came from reading or decoding the source image.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            PaletteError::Decode(_) | PaletteError::Io(_) | PaletteError::UnsupportedColor(_)
        )
    }
}
