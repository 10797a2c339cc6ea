//! Open Food Facts product lookup.

pub mod client;
pub mod nutrients;
pub mod product;

pub use client::{FoodClient, FoodError};
pub use nutrients::{parse_nutrients, pie_slices, Nutrient, PieSlice};
pub use product::FoodReport;
