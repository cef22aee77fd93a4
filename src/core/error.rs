use std::fmt;
use std::path::PathBuf;

/// Comprehensive error types for dashboard generation
#[derive(Debug)]
pub enum DashboardError {
    /// Malformed or missing input data
    Input(InputError),

    /// Output I/O failure
    Write(WriteError),

    /// Configuration error
    Config(String),
}

/// Failures while reading the price workbook
#[derive(Debug)]
pub enum InputError {
    /// The workbook could not be opened or parsed
    Workbook {
        path: PathBuf,
        source: calamine::Error,
    },

    /// The requested sheet does not exist
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// The header row lies beyond the last row of the sheet
    HeaderRowOutOfRange { header_row: usize, rows: usize },

    /// The sheet has no `Date` column
    MissingDateColumn { sheet: String },

    /// A non-empty Date cell could not be parsed
    InvalidDate { row: usize, value: String },

    /// No zone columns are left after filtering
    NoZoneColumns { sheet: String },
}

/// Failures while writing the dashboard or its CSV assets
#[derive(Debug)]
pub enum WriteError {
    /// File system error on a specific path
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// CSV serialization error
    Csv { path: PathBuf, source: csv::Error },

    /// Chart payload serialization error
    Serialization(serde_json::Error),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardError::Input(err) => write!(f, "Input error: {err}"),
            DashboardError::Write(err) => write!(f, "Write error: {err}"),
            DashboardError::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Workbook { path, source } => {
                write!(f, "could not read workbook '{}': {source}", path.display())
            }
            InputError::SheetNotFound { sheet, available } => write!(
                f,
                "sheet '{sheet}' not found (available: {})",
                available.join(", ")
            ),
            InputError::HeaderRowOutOfRange { header_row, rows } => write!(
                f,
                "header row {header_row} is out of range (sheet has {rows} rows)"
            ),
            InputError::MissingDateColumn { sheet } => {
                write!(f, "sheet '{sheet}' must contain a 'Date' column")
            }
            InputError::InvalidDate { row, value } => {
                write!(f, "row {row}: cannot parse '{value}' as a date-time")
            }
            InputError::NoZoneColumns { sheet } => {
                write!(f, "sheet '{sheet}' has no numeric zone columns")
            }
        }
    }
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::Io { path, source } => {
                write!(f, "could not write '{}': {source}", path.display())
            }
            WriteError::Csv { path, source } => {
                write!(f, "could not write CSV '{}': {source}", path.display())
            }
            WriteError::Serialization(err) => write!(f, "could not serialize chart data: {err}"),
        }
    }
}

impl std::error::Error for DashboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DashboardError::Input(err) => Some(err),
            DashboardError::Write(err) => Some(err),
            DashboardError::Config(_) => None,
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Workbook { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriteError::Io { source, .. } => Some(source),
            WriteError::Csv { source, .. } => Some(source),
            WriteError::Serialization(err) => Some(err),
        }
    }
}

impl WriteError {
    /// Attach the offending path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WriteError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<InputError> for DashboardError {
    fn from(err: InputError) -> Self {
        DashboardError::Input(err)
    }
}

impl From<WriteError> for DashboardError {
    fn from(err: WriteError) -> Self {
        DashboardError::Write(err)
    }
}

impl From<serde_json::Error> for WriteError {
    fn from(err: serde_json::Error) -> Self {
        WriteError::Serialization(err)
    }
}

impl From<toml::de::Error> for DashboardError {
    fn from(err: toml::de::Error) -> Self {
        DashboardError::Config(err.to_string())
    }
}

impl From<regex::Error> for DashboardError {
    fn from(err: regex::Error) -> Self {
        DashboardError::Config(format!("invalid zone pattern: {err}"))
    }
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let config_error = DashboardError::Config("missing input".to_string());
        assert_eq!(
            format!("{config_error}"),
            "Configuration error: missing input"
        );

        let input_error = DashboardError::from(InputError::MissingDateColumn {
            sheet: "ZoneWisePrices".to_string(),
        });
        assert_eq!(
            format!("{input_error}"),
            "Input error: sheet 'ZoneWisePrices' must contain a 'Date' column"
        );
    }

    #[test]
    fn test_sheet_not_found_lists_available_sheets() {
        let err = InputError::SheetNotFound {
            sheet: "Prices".to_string(),
            available: vec!["Sheet1".to_string(), "Sheet2".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Prices' not found (available: Sheet1, Sheet2)"
        );
    }

    #[test]
    fn test_write_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = DashboardError::from(WriteError::io("/readonly/out.html", io_error));

        assert!(matches!(err, DashboardError::Write(WriteError::Io { .. })));
        assert!(err.to_string().contains("/readonly/out.html"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = DashboardError::Write(WriteError::io("out.html", io_error));

        let write_err = err.source().expect("write error source");
        let io_err = write_err.source().expect("io error source");
        assert!(io_err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_no_source_variants() {
        let errors_without_source = vec![
            DashboardError::Config("test".to_string()),
        ];
        for error in errors_without_source {
            assert!(error.source().is_none());
        }

        let invalid_date = InputError::InvalidDate {
            row: 3,
            value: "yesterday".to_string(),
        };
        assert!(invalid_date.source().is_none());
    }

    #[test]
    fn test_error_from_toml() {
        let toml_error = toml::from_str::<toml::Value>("invalid toml [").unwrap_err();
        let err = DashboardError::from(toml_error);
        assert!(matches!(err, DashboardError::Config(_)));
    }

    #[test]
    fn test_error_from_regex() {
        let regex_error = regex::Regex::new("[invalid").unwrap_err();
        let err = DashboardError::from(regex_error);
        assert!(err.to_string().contains("invalid zone pattern"));
    }

    #[test]
    fn test_string_error_variants_display() {
        let errors = vec![
            DashboardError::Config("Bad config".to_string()),
            DashboardError::Input(InputError::NoZoneColumns {
                sheet: "S".to_string(),
            }),
            DashboardError::Input(InputError::HeaderRowOutOfRange {
                header_row: 9,
                rows: 2,
            }),
        ];

        for error in errors {
            let display_str = format!("{error}");
            assert!(!display_str.is_empty());
            assert!(display_str.contains(':'));
        }
    }
}
