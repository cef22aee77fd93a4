//! CSV downloads written next to the dashboard.

use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::Analysis;
use crate::core::constants::asset_files;
use crate::core::error::WriteError;
use crate::core::types::Observation;
use crate::reporting::logging;

/// A CSV file that was written, as linked from the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct CsvAsset {
    pub file_name: String,
    /// Link text in the downloads section
    pub label: &'static str,
    pub path: PathBuf,
    pub rows: usize,
}

/// Writes every CSV summary into one directory
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Create the directory and write all files, returning them in link order
    pub fn write_all(&self, analysis: &Analysis) -> Result<Vec<CsvAsset>, WriteError> {
        fs::create_dir_all(&self.dir).map_err(|e| WriteError::io(&self.dir, e))?;

        let files: [(String, &'static str, Vec<Vec<String>>); 10] = [
            (
                asset_files::ZONE_SUMMARY.to_string(),
                "Zone summary",
                zone_summary_rows(analysis),
            ),
            (
                asset_files::BUCKET_STATS.to_string(),
                "Per-zone bucket statistics",
                bucket_rows(analysis),
            ),
            (
                asset_files::MONTHLY_AVERAGES.to_string(),
                "Monthly averages (all zones, years and months)",
                monthly_rows(analysis),
            ),
            (
                asset_files::spikes(analysis.extremes),
                "Top price spikes",
                extreme_rows(&analysis.spikes),
            ),
            (
                asset_files::dips(analysis.extremes),
                "Top price dips",
                extreme_rows(&analysis.dips),
            ),
            (
                asset_files::SEASONAL.to_string(),
                "Seasonal summary",
                seasonal_rows(analysis),
            ),
            (
                asset_files::CORRELATION.to_string(),
                "Zone correlation matrix",
                correlation_rows(analysis),
            ),
            (
                asset_files::HOUR_OF_DAY.to_string(),
                "Hour-of-day profile",
                hour_rows(analysis),
            ),
            (
                asset_files::DAY_OF_WEEK.to_string(),
                "Day-of-week profile",
                weekday_rows(analysis),
            ),
            (
                asset_files::SPREAD.to_string(),
                "Inter-zonal spread timeseries",
                spread_rows(analysis),
            ),
        ];

        files
            .into_iter()
            .map(|(file_name, label, records)| -> Result<CsvAsset, WriteError> {
                let path = self.dir.join(&file_name);
                write_records(&path, &records)?;
                // header excluded
                let rows = records.len().saturating_sub(1);
                logging::log_asset_written(&path, rows);
                Ok(CsvAsset {
                    file_name,
                    label,
                    path,
                    rows,
                })
            })
            .collect()
    }
}

fn write_records(path: &Path, records: &[Vec<String>]) -> Result<(), WriteError> {
    let csv_err = |source| WriteError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    for record in records {
        writer.write_record(record).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| WriteError::io(path, e))
}

/// Empty cell for a missing statistic
pub fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn header(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

fn zone_summary_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "Rank", "Zone", "Count", "Mean", "Median", "P95", "Min", "Max", "Stdev",
    ])];
    rows.extend(analysis.zone_summaries.iter().map(|s| {
        vec![
            s.rank.to_string(),
            s.zone.clone(),
            s.count.to_string(),
            fmt_opt(s.mean),
            fmt_opt(s.median),
            fmt_opt(s.p95),
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.stdev),
        ]
    }));
    rows
}

fn bucket_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Zone", "Bucket", "Count", "Mean", "Min", "Max"])];
    rows.extend(analysis.bucket_stats.iter().map(|b| {
        vec![
            b.zone.clone(),
            analysis.granularity.label(b.bucket),
            b.count.to_string(),
            b.mean.to_string(),
            b.min.to_string(),
            b.max.to_string(),
        ]
    }));
    rows
}

fn monthly_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Zone", "Year", "Month", "YearMonth", "Price"])];
    rows.extend(analysis.monthly.iter().map(|m| {
        vec![
            m.zone.clone(),
            m.year.to_string(),
            m.month.to_string(),
            m.label(),
            m.price.to_string(),
        ]
    }));
    rows
}

fn extreme_rows(observations: &[Observation]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Date", "Zone", "Price"])];
    rows.extend(observations.iter().map(|o| {
        vec![
            o.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            o.zone.clone(),
            o.price.to_string(),
        ]
    }));
    rows
}

fn seasonal_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Season", "Mean", "Median", "Std", "Min", "Max"])];
    rows.extend(analysis.seasonal.iter().map(|s| {
        vec![
            s.season.name().to_string(),
            fmt_opt(s.mean),
            fmt_opt(s.median),
            fmt_opt(s.std),
            fmt_opt(s.min),
            fmt_opt(s.max),
        ]
    }));
    rows
}

fn correlation_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let corr = &analysis.correlation;
    let mut head = vec![String::new()];
    head.extend(corr.zones.iter().cloned());

    let mut rows = vec![head];
    rows.extend(corr.zones.iter().zip(&corr.values).map(|(zone, values)| {
        let mut row = vec![zone.clone()];
        row.extend(values.iter().map(|v| fmt_opt(*v)));
        row
    }));
    rows
}

fn hour_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Hour", "Price"])];
    rows.extend(
        analysis
            .hour_of_day
            .iter()
            .map(|h| vec![h.hour.to_string(), h.price.to_string()]),
    );
    rows
}

fn weekday_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["DOW", "Price"])];
    rows.extend(
        analysis
            .day_of_week
            .iter()
            .map(|d| vec![d.weekday.to_string(), fmt_opt(d.price)]),
    );
    rows
}

fn spread_rows(analysis: &Analysis) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Date", "Spread"])];
    rows.extend(analysis.spread.iter().map(|p| {
        vec![
            p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            fmt_opt(p.spread),
        ]
    }));
    rows
}
