use crate::errors::InputError;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::io::{BufReader, Read};

/// Timestamp layout of PVGIS hourly records, e.g. `20200101:0010`.
const PVGIS_TIME_FORMAT: &str = "%Y%m%d:%H%M";

/// The parts of a PVGIS hourly export (`seriescalc` with `outputformat=json`) that are read.
///
/// PVGIS writes many more fields per hour (irradiance, temperature, wind speed); only the
/// timestamp and the PV power are of interest here and the rest is ignored.
#[derive(Debug, Deserialize)]
struct PvgisExport {
    #[serde(default)]
    inputs: Option<PvgisInputs>,
    outputs: PvgisOutputs,
}

#[derive(Debug, Deserialize)]
struct PvgisOutputs {
    hourly: Vec<PvgisHourlyRecord>,
}

#[derive(Debug, Deserialize)]
struct PvgisHourlyRecord {
    time: String,
    #[serde(rename = "P")]
    power: f64,
}

/// Descriptive metadata PVGIS echoes back about the request. Only used for logging.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PvgisInputs {
    #[serde(default)]
    pub location: Option<PvgisLocation>,
    #[serde(default)]
    pub pv_module: Option<PvgisModule>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PvgisLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PvgisModule {
    #[serde(default)]
    pub technology: Option<String>,
    /// Installed peak power in kWp
    #[serde(default)]
    pub peak_power: Option<f64>,
    /// System losses in percent
    #[serde(default)]
    pub system_loss: Option<f64>,
}

/// One hour of PV output: local timestamp and instantaneous power in Watts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProductionRecord {
    pub timestamp: NaiveDateTime,
    pub power: f64,
}

/// A fully parsed production time series from one PVGIS export.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductionSeries {
    pub records: Vec<ProductionRecord>,
    pub inputs: Option<PvgisInputs>,
}

impl ProductionSeries {
    pub fn new(records: Vec<ProductionRecord>) -> Self {
        Self {
            records,
            inputs: None,
        }
    }

    pub fn total_power(&self) -> f64 {
        self.records.iter().map(|record| record.power).sum()
    }
}

/// Parses a PVGIS JSON export. Any malformed record fails the whole series.
pub fn production_series_from_json(json: impl Read) -> Result<ProductionSeries, InputError> {
    let export: PvgisExport = serde_json::from_reader(BufReader::new(json))?;

    let records = export
        .outputs
        .hourly
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let timestamp = NaiveDateTime::parse_from_str(&record.time, PVGIS_TIME_FORMAT)
                .map_err(|source| InputError::Timestamp {
                    record: idx as u64 + 1,
                    value: record.time.clone(),
                    source,
                })?;
            Ok(ProductionRecord {
                timestamp,
                power: record.power,
            })
        })
        .collect::<Result<Vec<_>, InputError>>()?;

    Ok(ProductionSeries {
        records,
        inputs: export.inputs,
    })
}
