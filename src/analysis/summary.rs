use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::stats::{self, Descriptive};
use crate::core::constants::buckets;
use crate::core::types::PriceTable;

/// Per-zone aggregate over the whole table.
///
/// Statistics are `None` for a zone without any price, which keeps the
/// record valid while making the gap explicit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone: String,
    /// 1 = highest mean price
    pub rank: usize,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub p95: Option<f64>,
    pub stdev: Option<f64>,
}

impl ZoneSummary {
    fn from_values(zone: &str, values: &[f64]) -> Self {
        let d: Option<Descriptive> = stats::describe(values);
        Self {
            zone: zone.to_string(),
            rank: 0,
            count: values.len(),
            mean: d.map(|d| d.mean),
            median: d.map(|d| d.median),
            min: d.map(|d| d.min),
            max: d.map(|d| d.max),
            p95: d.map(|d| d.p95),
            stdev: d.and_then(|d| d.stdev),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Whole-table key figures shown as KPI cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Number of hourly rows
    pub hours: usize,
    pub zones: usize,
    /// Number of non-missing prices
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub p95: Option<f64>,
    pub stdev: Option<f64>,
}

/// Time bucket used for per-zone statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Granularity {
    Daily,
    Monthly,
}

impl Granularity {
    /// First day of the bucket holding `ts`
    pub fn bucket_start(self, ts: NaiveDateTime) -> NaiveDate {
        let date = ts.date();
        match self {
            Granularity::Daily => date,
            Granularity::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// Label of a bucket as shown in CSV and charts
    pub fn label(self, bucket: NaiveDate) -> String {
        match self {
            Granularity::Daily => bucket.format("%Y-%m-%d").to_string(),
            Granularity::Monthly => bucket.format("%Y-%m").to_string(),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "{}", buckets::DAILY),
            Granularity::Monthly => write!(f, "{}", buckets::MONTHLY),
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            buckets::DAILY => Ok(Granularity::Daily),
            buckets::MONTHLY => Ok(Granularity::Monthly),
            other => Err(format!(
                "Invalid bucket '{other}'. Expected one of: {}.",
                buckets::ALL.join(", ")
            )),
        }
    }
}

/// Statistics of one zone inside one time bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketStats {
    pub zone: String,
    pub bucket: NaiveDate,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// One summary per zone column, highest mean first.
///
/// Zones without values sort last and keep their column order.
pub fn summarize_zones(table: &PriceTable) -> Vec<ZoneSummary> {
    let mut summaries: Vec<ZoneSummary> = table
        .zones()
        .iter()
        .enumerate()
        .map(|(idx, zone)| ZoneSummary::from_values(zone, &table.values(idx)))
        .collect();

    summaries.sort_by(|a, b| match (a.mean, b.mean) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    for (i, summary) in summaries.iter_mut().enumerate() {
        summary.rank = i + 1;
    }
    summaries
}

/// Per-zone statistics per time bucket, zones in column order, buckets ascending
pub fn bucket_stats(table: &PriceTable, granularity: Granularity) -> Vec<BucketStats> {
    let mut out = Vec::new();
    for (idx, zone) in table.zones().iter().enumerate() {
        let mut groups: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
        for row in table.rows() {
            if let Some(price) = row.prices[idx] {
                groups
                    .entry(granularity.bucket_start(row.timestamp))
                    .or_default()
                    .push(price);
            }
        }

        for (bucket, values) in groups {
            let (Some(mean), Some(min), Some(max)) =
                (stats::mean(&values), stats::min(&values), stats::max(&values))
            else {
                continue;
            };
            out.push(BucketStats {
                zone: zone.clone(),
                bucket,
                count: values.len(),
                mean,
                min,
                max,
            });
        }
    }
    out
}

/// Key figures across all zones and hours
pub fn overall_stats(table: &PriceTable) -> OverallStats {
    let values = table.all_values();
    let d = stats::describe(&values);

    OverallStats {
        start: table.start().map(|ts| ts.date()),
        end: table.end().map(|ts| ts.date()),
        hours: table.len(),
        zones: table.zones().len(),
        count: values.len(),
        mean: d.map(|d| d.mean),
        median: d.map(|d| d.median),
        min: d.map(|d| d.min),
        max: d.map(|d| d.max),
        p95: d.map(|d| d.p95),
        stdev: d.and_then(|d| d.stdev),
    }
}
