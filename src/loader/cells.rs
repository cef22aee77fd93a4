//! Coercion of workbook cells into timestamps and prices.

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Date-time layouts accepted in text cells, tried in order
const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Text values read as a missing price
const MISSING_MARKERS: [&str; 6] = ["nan", "na", "n/a", "#n/a", "null", "-"];

/// A cell that cannot be coerced to the requested type
#[derive(Debug, Clone, PartialEq)]
pub struct Uncoercible(pub String);

/// Parse a Date cell. `Ok(None)` for an empty cell.
pub fn parse_timestamp(cell: &Data) -> Result<Option<NaiveDateTime>, Uncoercible> {
    match cell {
        Data::Empty => Ok(None),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Some)
            .ok_or_else(|| Uncoercible(cell.to_string())),
        Data::Float(serial) => from_excel_serial(*serial)
            .map(Some)
            .ok_or_else(|| Uncoercible(cell.to_string())),
        Data::Int(serial) => from_excel_serial(*serial as f64)
            .map(Some)
            .ok_or_else(|| Uncoercible(cell.to_string())),
        Data::String(s) | Data::DateTimeIso(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            parse_datetime_str(s)
                .map(Some)
                .ok_or_else(|| Uncoercible(s.to_string()))
        }
        other => Err(Uncoercible(other.to_string())),
    }
}

/// Parse a zone cell. `Ok(None)` for empty cells, error cells and NaN markers.
pub fn parse_price(cell: &Data) -> Result<Option<f64>, Uncoercible> {
    match cell {
        Data::Empty | Data::Error(_) => Ok(None),
        Data::Float(v) if v.is_nan() => Ok(None),
        Data::Float(v) if v.is_finite() => Ok(Some(*v)),
        Data::Int(v) => Ok(Some(*v as f64)),
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() || MISSING_MARKERS.contains(&s.to_ascii_lowercase().as_str()) {
                return Ok(None);
            }
            match s.replace(',', "").parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                _ => Err(Uncoercible(s.to_string())),
            }
        }
        other => Err(Uncoercible(other.to_string())),
    }
}

/// Text of a header cell, trimmed
pub fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Convert an Excel serial day number (1900 date system) to a date-time
pub fn from_excel_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_strings() {
        let cases = [
            ("2024-01-05 13:00:00", dt(2024, 1, 5, 13)),
            ("2024-01-05 13:00", dt(2024, 1, 5, 13)),
            ("2024-01-05T13:00:00", dt(2024, 1, 5, 13)),
            ("01/05/2024 13:00", dt(2024, 1, 5, 13)),
            ("01/05/2024 1:00 PM", dt(2024, 1, 5, 13)),
            ("2024-01-05", dt(2024, 1, 5, 0)),
            ("  01/05/2024  ", dt(2024, 1, 5, 0)),
        ];
        for (input, expected) in cases {
            assert_eq!(
                parse_timestamp(&Data::String(input.to_string())),
                Ok(Some(expected)),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_parse_timestamp_excel_serial() {
        // 45292 = 2024-01-01, 1/24 day = one hour
        assert_eq!(
            parse_timestamp(&Data::Float(45292.0 + 1.0 / 24.0)),
            Ok(Some(dt(2024, 1, 1, 1)))
        );
        assert_eq!(parse_timestamp(&Data::Int(45292)), Ok(Some(dt(2024, 1, 1, 0))));
    }

    #[test]
    fn test_parse_timestamp_empty_and_invalid() {
        assert_eq!(parse_timestamp(&Data::Empty), Ok(None));
        assert_eq!(parse_timestamp(&Data::String("   ".into())), Ok(None));
        assert_eq!(
            parse_timestamp(&Data::String("yesterday".into())),
            Err(Uncoercible("yesterday".to_string()))
        );
        assert!(parse_timestamp(&Data::Bool(true)).is_err());
        assert!(parse_timestamp(&Data::Float(-1.0)).is_err());
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(&Data::Float(31.5)), Ok(Some(31.5)));
        assert_eq!(parse_price(&Data::Int(-4)), Ok(Some(-4.0)));
        assert_eq!(parse_price(&Data::String(" 1,250.75 ".into())), Ok(Some(1250.75)));
        assert_eq!(parse_price(&Data::Empty), Ok(None));
        assert_eq!(parse_price(&Data::String("N/A".into())), Ok(None));
        assert_eq!(parse_price(&Data::String("NaN".into())), Ok(None));
        assert_eq!(parse_price(&Data::Float(f64::NAN)), Ok(None));
        assert_eq!(parse_price(&Data::Error(CellErrorType::Div0)), Ok(None));
    }

    #[test]
    fn test_parse_price_rejects_text() {
        assert_eq!(
            parse_price(&Data::String("Western".into())),
            Err(Uncoercible("Western".to_string()))
        );
        assert!(parse_price(&Data::Bool(false)).is_err());
        assert!(parse_price(&Data::String("inf".into())).is_err());
    }

    #[test]
    fn test_header_name() {
        assert_eq!(header_name(&Data::String("  AECO ZONE ".into())), "AECO ZONE");
        assert_eq!(header_name(&Data::Empty), "");
        assert_eq!(header_name(&Data::Int(7)), "7");
    }

    #[test]
    fn test_from_excel_serial() {
        assert_eq!(from_excel_serial(1.0), Some(dt(1899, 12, 31, 0)));
        assert_eq!(from_excel_serial(f64::NAN), None);
    }
}
