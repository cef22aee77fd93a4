//! Workbook fixtures shared by the integration tests

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;

pub const SHEET: &str = "ZoneWisePrices";

/// Zones written by [`write_price_workbook`]; the last one has no prices
pub const ZONES: [&str; 4] = ["AECO", "BGE", "PJM-RTO ZONE", "EMPTY ZONE"];

/// Hours of price data in the fixture (three days)
pub const HOURS: u32 = 72;

/// Deterministic price of `zone` at `hour`
pub fn price(zone: usize, hour: u32) -> f64 {
    let base = [25.0, 32.5, 28.0][zone];
    base + f64::from(hour % 24) * 0.75 + f64::from(hour / 24) * 1.5
}

fn timestamp(hour: u32) -> String {
    format!("2024-01-{:02} {:02}:00:00", 1 + hour / 24, hour % 24)
}

/// A workbook with a Date column, three priced zones and one empty zone
pub fn write_price_workbook(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET)?;

    sheet.write_string(0, 0, "Date")?;
    for (col, zone) in ZONES.iter().enumerate() {
        sheet.write_string(0, col as u16 + 1, *zone)?;
    }

    for hour in 0..HOURS {
        let row = hour + 1;
        sheet.write_string(row, 0, &timestamp(hour))?;
        for zone in 0..3 {
            sheet.write_number(row, zone as u16 + 1, price(zone, hour))?;
        }
    }

    workbook.save(path)
}

/// A sheet whose first column is not called `Date`
pub fn write_workbook_without_date(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET)?;

    sheet.write_string(0, 0, "Timestamp")?;
    sheet.write_string(0, 1, "AECO")?;
    sheet.write_string(1, 0, "2024-01-01 00:00:00")?;
    sheet.write_number(1, 1, 21.5)?;

    workbook.save(path)
}

/// The price workbook plus a text-only `Notes` column that the loader drops
pub fn write_workbook_with_notes(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET)?;

    sheet.write_string(0, 0, "Date")?;
    sheet.write_string(0, 1, "AECO")?;
    sheet.write_string(0, 2, "Notes")?;
    for hour in 0..24 {
        let row = hour + 1;
        sheet.write_string(row, 0, &timestamp(hour))?;
        sheet.write_number(row, 1, price(0, hour))?;
        sheet.write_string(row, 2, "checked")?;
    }

    workbook.save(path)
}
