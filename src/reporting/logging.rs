use crate::config::Config;
use log::{debug, error, info, warn};
use std::path::Path;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    info!(
        "Input: workbook={}, sheet={}, header_row={}",
        config.input.as_deref().unwrap_or("<none>"),
        config.sheet_name(),
        config.header_row()
    );
    info!(
        "Output: html={}, assets={}, plotlyjs={}",
        config.output_path().display(),
        config.assets_path().display(),
        config.include_plotlyjs.as_deref().unwrap_or("cdn")
    );
    info!(
        "Charts: top_zones={}, spark_zones={}, extremes={}, rolling={}h/{}",
        config.top_zones(),
        config.spark_zones(),
        config.extremes(),
        config.rolling_window(),
        config.rolling_min_periods()
    );
    if let Some(patterns) = &config.exclude_zones
        && !patterns.is_empty()
    {
        debug!("Excluding zones matching: {}", patterns.join(", "));
    }
}

/// Log the shape of the loaded price table
pub fn log_table_loaded(rows: usize, zones: usize, skipped_rows: usize) {
    info!("Loaded {rows} hourly row(s) across {zones} zone(s)");
    if skipped_rows > 0 {
        debug!("Skipped {skipped_rows} row(s) with an empty Date cell");
    }
}

/// Log a column that was left out of the price table
pub fn log_dropped_column(column: &str, reason: &str) {
    warn!("Dropping column '{column}': {reason}");
}

/// Log the outcome of the aggregation step
pub fn log_summary_computed(zones: usize, empty_zones: usize, duration_ms: u128) {
    if empty_zones == 0 {
        info!("✅ Summarized {zones} zone(s) ({duration_ms}ms)");
    } else {
        warn!("Summarized {zones} zone(s), {empty_zones} without any price ({duration_ms}ms)");
    }
}

/// Log a file written to disk
pub fn log_asset_written<P: AsRef<Path>>(path: P, rows: usize) {
    debug!("Wrote {} ({rows} row(s))", path.as_ref().display());
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}
