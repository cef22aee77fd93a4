//! pjm-dashboard: PJM day-ahead zonal prices as an HTML dashboard
//!
//! The pipeline runs in four steps:
//! [`loader`] reads the workbook into a [`PriceTable`],
//! [`analysis`] aggregates it, [`render`] turns the aggregates into Plotly
//! figures and [`reporting`] writes the CSV downloads and the page.

// Core modules
pub mod core;

// Configuration
pub mod config;

// Pipeline stages
pub mod analysis;
pub mod loader;
pub mod render;
pub mod reporting;

// User interface
pub mod ui;

pub use crate::analysis::{Analysis, AnalysisOptions, ZoneSummary};
pub use crate::config::{CliConfig, Config};
pub use crate::core::{DashboardError, InputError, PriceTable, Result, WriteError};
pub use crate::loader::{LoadedTable, WorkbookLoader};
pub use crate::render::{ChartSet, RenderOptions};
pub use crate::reporting::{CsvExporter, DashboardData, HtmlDashboard, PlotlyJsMode};
