//! Small labelled tables drawn as grouped bars or pie shares.

pub mod table;

pub use table::{ChartType, DataRow, DataTable, DataVizError};
