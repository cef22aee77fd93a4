//! Dashboard output and logging
//!
//! This module writes the HTML dashboard and its CSV downloads, and holds
//! the structured logging helpers used across the application.

pub mod csv_export;
pub mod dashboard;
pub mod logging;

// Re-export commonly used items
pub use csv_export::{CsvAsset, CsvExporter};
pub use dashboard::{DashboardData, HtmlDashboard, PlotlyJsMode, asset_link_prefix};
