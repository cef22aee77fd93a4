//! Chart rendering
//!
//! Turns the price table and its analysis into Plotly figures. Nothing here
//! touches the file system.

pub mod charts;
pub mod figure;

pub use charts::{ChartSet, RenderOptions, default_zone};
pub use figure::Figure;
