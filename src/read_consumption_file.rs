use crate::errors::InputError;
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ReaderBuilder as CsvReaderBuilder;
use std::io::Read;

// InfluxDB annotated CSV: #group, #datatype, #default and the column header come first
const ANNOTATION_LINES: u64 = 4;
const COLUMN_TIME: usize = 5; // _time, UTC
const COLUMN_VALUE: usize = 6; // _value, power in W
const COLUMN_PHASE: usize = 11; // phase tag, "L1" to "L3"

const INFLUX_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Line conductor a reading was metered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    L1,
    L2,
    L3,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::L1, Phase::L2, Phase::L3];

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Phase::L1),
            2 => Some(Phase::L2),
            3 => Some(Phase::L3),
            _ => None,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Phase::L1 => 0,
            Phase::L2 => 1,
            Phase::L3 => 2,
        }
    }

    /// Reads a tag such as `L2`: the first character is a prefix, the rest the phase number.
    fn from_tag(tag: &str) -> Option<Self> {
        let mut chars = tag.chars();
        chars.next()?;
        chars.as_str().trim().parse().ok().and_then(Self::from_number)
    }
}

/// A single metered power reading for one phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeterReading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub phase: Phase,
}

/// Reads an InfluxDB CSV export of per-phase power readings.
///
/// Annotation lines and blank lines are skipped. Any record with an unreadable timestamp, value
/// or phase fails the whole file.
pub fn consumption_history_from_csv(file: impl Read) -> Result<Vec<MeterReading>, InputError> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(file);

    let mut readings = vec![];

    for result in reader.records() {
        let record: csv::StringRecord = result?;
        let line = record.position().map_or(0, |position| position.line());
        if line <= ANNOTATION_LINES {
            continue;
        }

        let column = |column: usize, field: &'static str| {
            record.get(column).ok_or(InputError::MissingColumn {
                record: line,
                column,
                field,
            })
        };

        let time = column(COLUMN_TIME, "time")?;
        let timestamp = NaiveDateTime::parse_from_str(time, INFLUX_TIME_FORMAT)
            .map_err(|source| InputError::Timestamp {
                record: line,
                value: time.to_string(),
                source,
            })?
            .and_utc();

        let value = column(COLUMN_VALUE, "value")?;
        let value = value.trim().parse::<f64>().map_err(|_| InputError::Field {
            record: line,
            field: "value",
            value: value.to_string(),
        })?;

        let phase = column(COLUMN_PHASE, "phase")?;
        let phase = Phase::from_tag(phase).ok_or_else(|| InputError::Field {
            record: line,
            field: "phase",
            value: phase.to_string(),
        })?;

        readings.push(MeterReading {
            timestamp,
            value,
            phase,
        });
    }

    Ok(readings)
}
