//! Configuration management
//!
//! This module handles loading and managing configuration from
//! TOML files and CLI arguments.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::Granularity;
use crate::core::constants::{buckets, defaults, include_modes, workbook};
use crate::core::error::{DashboardError, Result};
use crate::reporting::PlotlyJsMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the price workbook
    pub input: Option<String>,

    /// Sheet holding the zone-wise prices
    pub sheet: Option<String>,

    /// 0-based row holding the column headers
    pub header_row: Option<usize>,

    /// Output HTML file
    pub output: Option<String>,

    /// Folder for CSV downloads
    pub assets_dir: Option<String>,

    /// Plotly.js inclusion mode (cdn, true, false)
    pub include_plotlyjs: Option<String>,

    /// Local plotly.min.js inlined when include_plotlyjs = "true"
    pub plotlyjs_bundle: Option<String>,

    /// Time bucket for per-zone statistics (daily, monthly)
    pub bucket: Option<String>,

    /// Zones shown in the trend and box charts
    pub top_zones: Option<usize>,

    /// Zones shown as sparklines
    pub spark_zones: Option<usize>,

    /// Rows in each spikes/dips table
    pub extremes: Option<usize>,

    /// Rolling window length in hourly rows
    pub rolling_window: Option<usize>,

    /// Minimum observations inside a rolling window
    pub rolling_min_periods: Option<usize>,

    /// Histogram bin count
    pub histogram_bins: Option<usize>,

    /// Zone pre-selected in single-zone charts
    pub default_zone: Option<String>,

    /// Zone name patterns to leave out (regex)
    pub exclude_zones: Option<Vec<String>>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            sheet: Some(workbook::DEFAULT_SHEET.to_string()),
            header_row: Some(workbook::DEFAULT_HEADER_ROW),
            output: Some(defaults::OUTPUT_HTML.to_string()),
            assets_dir: Some(defaults::ASSETS_DIR.to_string()),
            include_plotlyjs: Some(include_modes::DEFAULT.to_string()),
            plotlyjs_bundle: None,
            bucket: Some(buckets::DEFAULT.to_string()),
            top_zones: Some(defaults::TOP_ZONES),
            spark_zones: Some(defaults::SPARK_ZONES),
            extremes: Some(defaults::EXTREMES),
            rolling_window: Some(defaults::ROLLING_WINDOW_HOURS),
            rolling_min_periods: Some(defaults::ROLLING_MIN_PERIODS),
            histogram_bins: Some(defaults::HISTOGRAM_BINS),
            default_zone: None, // Falls back to PJM-RTO ZONE, then the first zone
            exclude_zones: None,
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults for absent keys
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DashboardError::Config(format!(
                "Could not read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            DashboardError::Config(format!(
                "Invalid TOML in config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate_ranges()?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        if let Ok(config) = Self::load_from_file(defaults::CONFIG_FILE_NAME) {
            return config;
        }

        // Parent directories, up to 3 levels
        for i in 1..=3 {
            let path = format!("{}{}", "../".repeat(i), defaults::CONFIG_FILE_NAME);
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        Self::default()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        // Input
        if let Some(ref input) = cli_config.input {
            self.input = Some(input.clone());
        }
        if let Some(ref sheet) = cli_config.sheet {
            self.sheet = Some(sheet.clone());
        }
        if let Some(header_row) = cli_config.header_row {
            self.header_row = Some(header_row);
        }
        if let Some(ref exclude_zones) = cli_config.exclude_zones {
            self.exclude_zones = Some(exclude_zones.clone());
        }

        // Output
        if let Some(ref output) = cli_config.output {
            self.output = Some(output.clone());
        }
        if let Some(ref assets_dir) = cli_config.assets_dir {
            self.assets_dir = Some(assets_dir.clone());
        }
        if let Some(ref mode) = cli_config.include_plotlyjs {
            self.include_plotlyjs = Some(mode.clone());
        }
        if let Some(ref bundle) = cli_config.plotlyjs_bundle {
            self.plotlyjs_bundle = Some(bundle.clone());
        }

        // Analysis
        if let Some(ref bucket) = cli_config.bucket {
            self.bucket = Some(bucket.clone());
        }
        if let Some(top_zones) = cli_config.top_zones {
            self.top_zones = Some(top_zones);
        }
        if let Some(ref zone) = cli_config.default_zone {
            self.default_zone = Some(zone.clone());
        }

        if cli_config.verbose {
            self.verbose = Some(true);
        }
    }

    /// Compile zone exclusion patterns into regex objects
    pub fn compile_exclude_patterns(&self) -> Result<Vec<Regex>> {
        let mut compiled = Vec::new();
        if let Some(ref patterns) = self.exclude_zones {
            for pattern in patterns {
                compiled.push(Regex::new(pattern)?);
            }
        }
        Ok(compiled)
    }

    /// Input workbook path; errors when neither CLI nor config file named one
    pub fn input_path(&self) -> Result<PathBuf> {
        self.input
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                DashboardError::Config(
                    "No input workbook given. Pass --input <path> or set `input` in the config file."
                        .to_string(),
                )
            })
    }

    pub fn sheet_name(&self) -> &str {
        self.sheet.as_deref().unwrap_or(workbook::DEFAULT_SHEET)
    }

    pub fn header_row(&self) -> usize {
        self.header_row.unwrap_or(workbook::DEFAULT_HEADER_ROW)
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(self.output.as_deref().unwrap_or(defaults::OUTPUT_HTML))
    }

    pub fn assets_path(&self) -> PathBuf {
        PathBuf::from(self.assets_dir.as_deref().unwrap_or(defaults::ASSETS_DIR))
    }

    /// Resolve the Plotly.js inclusion mode
    pub fn plotlyjs_mode(&self) -> Result<PlotlyJsMode> {
        let mode = self
            .include_plotlyjs
            .as_deref()
            .unwrap_or(include_modes::DEFAULT);
        PlotlyJsMode::from_config(mode, self.plotlyjs_bundle.as_deref())
    }

    /// Resolve the time bucket granularity
    pub fn granularity(&self) -> Result<Granularity> {
        let bucket = self.bucket.as_deref().unwrap_or(buckets::DEFAULT);
        bucket.parse::<Granularity>().map_err(DashboardError::Config)
    }

    pub fn top_zones(&self) -> usize {
        self.top_zones.unwrap_or(defaults::TOP_ZONES)
    }

    pub fn spark_zones(&self) -> usize {
        self.spark_zones.unwrap_or(defaults::SPARK_ZONES)
    }

    pub fn extremes(&self) -> usize {
        self.extremes.unwrap_or(defaults::EXTREMES)
    }

    pub fn rolling_window(&self) -> usize {
        self.rolling_window
            .unwrap_or(defaults::ROLLING_WINDOW_HOURS)
    }

    pub fn rolling_min_periods(&self) -> usize {
        self.rolling_min_periods
            .unwrap_or(defaults::ROLLING_MIN_PERIODS)
    }

    pub fn histogram_bins(&self) -> usize {
        self.histogram_bins.unwrap_or(defaults::HISTOGRAM_BINS)
    }

    /// Check value ranges that do not depend on CLI input
    fn validate_ranges(&self) -> Result<()> {
        for (name, value) in [
            ("top_zones", self.top_zones),
            ("spark_zones", self.spark_zones),
            ("extremes", self.extremes),
            ("rolling_window", self.rolling_window),
            ("rolling_min_periods", self.rolling_min_periods),
            ("histogram_bins", self.histogram_bins),
        ] {
            if value == Some(0) {
                return Err(DashboardError::Config(format!(
                    "{name} cannot be 0. Expected a positive integer."
                )));
            }
        }

        if self.rolling_min_periods() > self.rolling_window() {
            return Err(DashboardError::Config(format!(
                "rolling_min_periods ({}) cannot exceed rolling_window ({}).",
                self.rolling_min_periods(),
                self.rolling_window()
            )));
        }

        if let Some(ref sheet) = self.sheet
            && sheet.trim().is_empty()
        {
            return Err(DashboardError::Config(
                "Sheet name cannot be empty.".to_string(),
            ));
        }

        if let Some(ref mode) = self.include_plotlyjs
            && !include_modes::ALL.contains(&mode.as_str())
        {
            return Err(DashboardError::Config(format!(
                "Invalid include_plotlyjs mode '{mode}'. Expected one of: {}.",
                include_modes::ALL.join(", ")
            )));
        }

        if let Some(ref bucket) = self.bucket
            && !buckets::ALL.contains(&bucket.as_str())
        {
            return Err(DashboardError::Config(format!(
                "Invalid bucket '{bucket}'. Expected one of: {}.",
                buckets::ALL.join(", ")
            )));
        }

        self.compile_exclude_patterns()?;
        Ok(())
    }

    /// Validate the merged configuration before running the pipeline
    pub fn validate(&self) -> Result<()> {
        self.validate_ranges()?;
        self.input_path()?;
        self.plotlyjs_mode()?;
        Ok(())
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    // Input
    pub input: Option<String>,              // --input
    pub sheet: Option<String>,              // --sheet
    pub header_row: Option<usize>,          // --header-row
    pub exclude_zones: Option<Vec<String>>, // --exclude-zone

    // Output
    pub output: Option<String>,           // --output
    pub assets_dir: Option<String>,       // --assets-dir
    pub include_plotlyjs: Option<String>, // --include-plotlyjs
    pub plotlyjs_bundle: Option<String>,  // --plotlyjs-bundle

    // Analysis
    pub bucket: Option<String>,       // --bucket
    pub top_zones: Option<usize>,     // --top-zones
    pub default_zone: Option<String>, // --default-zone

    // Verbosity
    pub quiet: bool,   // --quiet
    pub verbose: bool, // --verbose

    // Configuration
    pub config_file: Option<String>, // --config
    pub no_config: bool,             // --no-config
}
