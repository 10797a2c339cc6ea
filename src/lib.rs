pub mod app;
pub mod data;
pub mod dataviz;
pub mod editor;
pub mod food;
pub mod graph;
pub mod palette;
pub mod render;
pub mod utils;
