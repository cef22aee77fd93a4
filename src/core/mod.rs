//! Core types and foundational components
//!
//! This module contains the price table model, error handling,
//! and constants used throughout the application.

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items for convenience
pub use error::{DashboardError, InputError, Result, WriteError};
pub use types::{Observation, PriceRow, PriceTable, PriceTableError};
