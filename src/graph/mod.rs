//! Single-variable expression parsing and plotting helpers.

pub mod expr;
pub mod plot;

pub use expr::{parse, Expr, ExprError};
pub use plot::{classify, nice_increment, sample, ticks, FigureType, PlotBounds};
