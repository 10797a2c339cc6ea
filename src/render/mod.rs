pub mod color;
pub mod graph_view;
pub mod swatch_view;
