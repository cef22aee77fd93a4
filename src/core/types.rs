use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fmt;

/// One hourly row of the price sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    /// Delivery hour
    pub timestamp: NaiveDateTime,
    /// One cell per zone, in table column order (`None` = missing)
    pub prices: Vec<Option<f64>>,
}

impl PriceRow {
    pub fn new(timestamp: NaiveDateTime, prices: Vec<Option<f64>>) -> Self {
        Self { timestamp, prices }
    }

    /// Prices present in this row
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.prices.iter().filter_map(|p| *p)
    }
}

/// A single (timestamp, zone, price) observation of the long-form table.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub zone: String,
    pub price: f64,
}

/// Day-ahead prices keyed by timestamp with one column per zone.
///
/// Rows are kept in ascending timestamp order and every row carries exactly
/// one cell per zone.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    zones: Vec<String>,
    rows: Vec<PriceRow>,
}

/// Errors that can occur when assembling a `PriceTable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceTableError {
    /// A zone name appears twice
    DuplicateZone(String),
    /// A zone name is empty
    EmptyZoneName,
    /// A row does not have one cell per zone
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for PriceTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateZone(zone) => write!(f, "Zone '{zone}' appears more than once"),
            Self::EmptyZoneName => write!(f, "Zone names cannot be empty"),
            Self::RowWidthMismatch {
                row,
                expected,
                found,
            } => write!(f, "Row {row} has {found} cells, expected {expected}"),
        }
    }
}

impl std::error::Error for PriceTableError {}

impl PriceTable {
    /// Create a table, sorting rows by timestamp.
    ///
    /// The sort is stable so rows sharing a timestamp keep their sheet order.
    pub fn new(zones: Vec<String>, mut rows: Vec<PriceRow>) -> Result<Self, PriceTableError> {
        let mut seen = HashSet::with_capacity(zones.len());
        for zone in &zones {
            if zone.trim().is_empty() {
                return Err(PriceTableError::EmptyZoneName);
            }
            if !seen.insert(zone.as_str()) {
                return Err(PriceTableError::DuplicateZone(zone.clone()));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.prices.len() != zones.len() {
                return Err(PriceTableError::RowWidthMismatch {
                    row: i,
                    expected: zones.len(),
                    found: row.prices.len(),
                });
            }
        }

        rows.sort_by_key(|row| row.timestamp);
        Ok(Self { zones, rows })
    }

    pub fn zones(&self) -> &[String] {
        &self.zones
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    /// Number of hourly rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn zone_index(&self, zone: &str) -> Option<usize> {
        self.zones.iter().position(|z| z == zone)
    }

    /// All cells of one zone column, in row order
    pub fn column(&self, zone_idx: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.rows.iter().map(move |row| row.prices[zone_idx])
    }

    /// Non-missing prices of one zone column, in row order
    pub fn values(&self, zone_idx: usize) -> Vec<f64> {
        self.column(zone_idx).flatten().collect()
    }

    /// Every non-missing price in the table, row by row
    pub fn all_values(&self) -> Vec<f64> {
        self.rows.iter().flat_map(|row| row.present()).collect()
    }

    /// Long-form view of the table, skipping missing cells
    pub fn observations(&self) -> impl Iterator<Item = Observation> + '_ {
        self.rows.iter().flat_map(move |row| {
            row.prices
                .iter()
                .zip(self.zones.iter())
                .filter_map(move |(price, zone)| {
                    price.map(|price| Observation {
                        timestamp: row.timestamp,
                        zone: zone.clone(),
                        price,
                    })
                })
        })
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.rows.first().map(|row| row.timestamp)
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|row| row.timestamp)
    }

    /// Number of rows whose timestamp repeats the previous row's
    pub fn duplicate_timestamps(&self) -> usize {
        self.rows
            .windows(2)
            .filter(|pair| pair[0].timestamp == pair[1].timestamp)
            .count()
    }
}
