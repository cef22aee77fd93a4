//! Workbook loading
//!
//! Reads the zone-wise price sheet into a [`PriceTable`]. Numeric columns
//! other than `Date` become zones. Columns holding text are dropped with a
//! warning, while columns that are entirely empty are kept so they show up
//! as zones without data.

pub mod cells;

use calamine::{Data, Reader, open_workbook_auto};
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::core::constants::workbook;
use crate::core::error::InputError;
use crate::core::types::{PriceRow, PriceTable};
use crate::reporting::logging;

/// A loaded table plus what was left out on the way
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: PriceTable,
    /// Column name and reason for every dropped column
    pub dropped_columns: Vec<(String, String)>,
    /// Rows skipped because their Date cell was empty
    pub skipped_rows: usize,
}

/// Reads one sheet of a workbook into a price table
#[derive(Debug, Clone)]
pub struct WorkbookLoader {
    path: PathBuf,
    sheet: String,
    header_row: usize,
    exclude: Vec<Regex>,
}

impl WorkbookLoader {
    pub fn new<P: AsRef<Path>>(path: P, sheet: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet: sheet.to_string(),
            header_row: workbook::DEFAULT_HEADER_ROW,
            exclude: Vec::new(),
        }
    }

    /// 0-based header row, counted from the first used row of the sheet
    pub fn header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// Zone names matching any of these patterns are left out
    pub fn exclude(mut self, patterns: Vec<Regex>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn load(&self) -> Result<LoadedTable, InputError> {
        let mut workbook = open_workbook_auto(&self.path).map_err(|source| InputError::Workbook {
            path: self.path.clone(),
            source,
        })?;

        let available = workbook.sheet_names();
        if !available.iter().any(|name| name == &self.sheet) {
            return Err(InputError::SheetNotFound {
                sheet: self.sheet.clone(),
                available,
            });
        }

        let range = workbook
            .worksheet_range(&self.sheet)
            .map_err(|source| InputError::Workbook {
                path: self.path.clone(),
                source,
            })?;

        let rows: Vec<&[Data]> = range.rows().collect();
        let loaded = table_from_rows(&rows, &self.sheet, self.header_row, &self.exclude)?;

        for (column, reason) in &loaded.dropped_columns {
            logging::log_dropped_column(column, reason);
        }
        let duplicates = loaded.table.duplicate_timestamps();
        if duplicates > 0 {
            logging::log_warning(&format!(
                "{duplicates} row(s) repeat the previous timestamp; all are kept"
            ));
        }
        logging::log_table_loaded(
            loaded.table.len(),
            loaded.table.zones().len(),
            loaded.skipped_rows,
        );

        Ok(loaded)
    }
}

/// Build a price table from raw sheet rows.
///
/// `header_row` indexes into `rows`; rows above it are ignored.
pub fn table_from_rows<R: AsRef<[Data]>>(
    rows: &[R],
    sheet: &str,
    header_row: usize,
    exclude: &[Regex],
) -> Result<LoadedTable, InputError> {
    let header = rows
        .get(header_row)
        .ok_or(InputError::HeaderRowOutOfRange {
            header_row,
            rows: rows.len(),
        })?
        .as_ref();
    let body = &rows[header_row + 1..];

    let names: Vec<String> = header.iter().map(cells::header_name).collect();
    let date_col = names
        .iter()
        .position(|name| name == workbook::DATE_COLUMN)
        .ok_or_else(|| InputError::MissingDateColumn {
            sheet: sheet.to_string(),
        })?;

    let mut zones: Vec<(usize, String)> = Vec::new();
    let mut dropped_columns = Vec::new();

    for (col, name) in names.iter().enumerate() {
        if col == date_col || name.is_empty() {
            continue;
        }
        if zones.iter().any(|(_, zone)| zone == name) {
            dropped_columns.push((name.clone(), "duplicate column name".to_string()));
            continue;
        }
        if exclude.iter().any(|re| re.is_match(name)) {
            dropped_columns.push((name.clone(), "matches an exclude pattern".to_string()));
            continue;
        }
        let offending = body
            .iter()
            .map(|row| cell(row.as_ref(), col))
            .find_map(|c| cells::parse_price(c).err());
        match offending {
            Some(value) => dropped_columns.push((
                name.clone(),
                format!("contains non-numeric value '{}'", value.0),
            )),
            None => zones.push((col, name.clone())),
        }
    }

    if zones.is_empty() {
        return Err(InputError::NoZoneColumns {
            sheet: sheet.to_string(),
        });
    }

    let mut price_rows = Vec::with_capacity(body.len());
    let mut skipped_rows = 0;

    for (i, row) in body.iter().enumerate() {
        let row = row.as_ref();
        let timestamp = match cells::parse_timestamp(cell(row, date_col)) {
            Ok(Some(ts)) => ts,
            Ok(None) => {
                skipped_rows += 1;
                continue;
            }
            Err(value) => {
                return Err(InputError::InvalidDate {
                    // 1-based, as shown by spreadsheet applications
                    row: header_row + i + 2,
                    value: value.0,
                });
            }
        };
        let prices = zones
            .iter()
            .map(|(col, _)| cells::parse_price(cell(row, *col)).ok().flatten())
            .collect();
        price_rows.push(PriceRow::new(timestamp, prices));
    }

    let zone_names = zones.into_iter().map(|(_, name)| name).collect();
    // names are unique and non-empty and every row has one cell per zone
    let table = PriceTable::new(zone_names, price_rows).map_err(|_| InputError::NoZoneColumns {
        sheet: sheet.to_string(),
    })?;

    Ok(LoadedTable {
        table,
        dropped_columns,
        skipped_rows,
    })
}

fn cell(row: &[Data], col: usize) -> &Data {
    row.get(col).unwrap_or(&Data::Empty)
}
