//! Photo adjustments: colour matrix filters plus crop/rotate/resize.

pub mod adjust;
pub mod matrix;
pub mod transform;

pub use adjust::Adjustments;
pub use matrix::ColorMatrix;
pub use transform::{crop_center, parse_size, resize, rotate, EditError};
