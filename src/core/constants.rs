/// Application-wide constants to avoid magic values throughout the codebase.
///
/// This module centralizes column names, default settings, output file names
/// and other literal values used across the application.
/// Workbook layout constants
pub mod workbook {
    /// Name of the timestamp column every price sheet must carry
    pub const DATE_COLUMN: &str = "Date";
    /// Default sheet holding the zone-wise prices
    pub const DEFAULT_SHEET: &str = "ZoneWisePrices";
    /// Default 0-based header row
    pub const DEFAULT_HEADER_ROW: usize = 0;
    /// Zone preferred for single-zone charts when present
    pub const PREFERRED_ZONE: &str = "PJM-RTO ZONE";
}

/// Plotly.js inclusion modes
pub mod include_modes {
    /// Reference Plotly.js from the CDN
    pub const CDN: &str = "cdn";
    /// Inline a local Plotly.js bundle into the page
    pub const EMBED: &str = "true";
    /// Emit no Plotly.js at all
    pub const NONE: &str = "false";

    /// Default inclusion mode
    pub const DEFAULT: &str = CDN;

    /// All valid inclusion modes
    pub const ALL: [&str; 3] = [CDN, EMBED, NONE];
}

/// Time bucket granularities for per-zone statistics
pub mod buckets {
    pub const DAILY: &str = "daily";
    pub const MONTHLY: &str = "monthly";

    pub const DEFAULT: &str = MONTHLY;

    pub const ALL: [&str; 2] = [DAILY, MONTHLY];
}

/// Default analysis parameters
pub mod defaults {
    /// Default output HTML file
    pub const OUTPUT_HTML: &str = "PJM_Unified_Dashboard.html";
    /// Default directory for CSV downloads
    pub const ASSETS_DIR: &str = "assets";
    /// Zones shown in the trend and box charts
    pub const TOP_ZONES: usize = 10;
    /// Zones shown as sparklines
    pub const SPARK_ZONES: usize = 12;
    /// Rows in each extremes table
    pub const EXTREMES: usize = 20;
    /// Rolling window in hourly rows (30 days)
    pub const ROLLING_WINDOW_HOURS: usize = 24 * 30;
    /// Minimum observations inside a rolling window
    pub const ROLLING_MIN_PERIODS: usize = 24;
    /// Histogram bins
    pub const HISTOGRAM_BINS: usize = 80;
    /// Percentile reported next to the median
    pub const PERCENTILE: f64 = 0.95;
    /// Config file searched in the working directory and its parents
    pub const CONFIG_FILE_NAME: &str = ".pjm-dashboard.toml";
}

/// Names of the CSV files written to the asset directory
pub mod asset_files {
    pub const ZONE_SUMMARY: &str = "zone_summary.csv";
    pub const BUCKET_STATS: &str = "zone_bucket_stats.csv";
    pub const MONTHLY_AVERAGES: &str = "zone_year_month_avg_prices.csv";
    pub const SEASONAL: &str = "seasonal_summary.csv";
    pub const CORRELATION: &str = "zone_correlation.csv";
    pub const HOUR_OF_DAY: &str = "hour_of_day_profile.csv";
    pub const DAY_OF_WEEK: &str = "day_of_week_profile.csv";
    pub const SPREAD: &str = "interzonal_spread_timeseries.csv";

    /// Highest prices, named after how many are listed
    pub fn spikes(n: usize) -> String {
        format!("top{n}_price_spikes.csv")
    }

    /// Lowest prices, named after how many are listed
    pub fn dips(n: usize) -> String {
        format!("top{n}_price_dips.csv")
    }
}

/// Display and formatting constants
pub mod display {
    /// Emoji for success status
    pub const SUCCESS_EMOJI: &str = "✅";
    /// Emoji for the asset directory line
    pub const FOLDER_EMOJI: &str = "📁";
    /// Unit label used on price axes
    pub const PRICE_UNIT: &str = "$/MWh";
}
