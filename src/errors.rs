use std::path::PathBuf;
use thiserror::Error;

/// Required settings that are missing or out of range. Detected before any input is read.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("At least one PVGIS time series file is required")]
    NoProductionSeries,
    #[error("Inverter power limit must be a positive number of Watts, got {0}")]
    InvalidInverterLimit(u32),
    #[error("Constant consumption must be a positive number of Watts, got {0}")]
    InvalidConstantConsumption(u32),
    #[error("No consumption source given: pass a constant consumption or a consumption history file")]
    MissingConsumptionSource,
    #[error("First weekday must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidFirstWeekday(u32),
    #[error("Savings rate must be a finite, non-negative number, got {0}")]
    InvalidSavingsRate(f64),
}

/// A record in an input file could not be interpreted. Aborts ingestion of the whole file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed PVGIS JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid timestamp '{value}' in record {record}: {source}")]
    Timestamp {
        record: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("Invalid {field} '{value}' in record {record}")]
    Field {
        record: u64,
        field: &'static str,
        value: String,
    },
    #[error("Record {record} is missing column {column} ({field})")]
    MissingColumn {
        record: u64,
        column: usize,
        field: &'static str,
    },
}

impl InputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
