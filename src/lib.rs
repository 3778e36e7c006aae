pub mod calendar_grid;
pub mod config;
pub mod core;
pub mod errors;
pub mod input;
pub mod output;
pub mod read_consumption_file;
pub mod report;
mod statistics;

use crate::config::{ConsumptionSource, SimulationConfig};
use crate::core::consumption::{
    constant_consumption, weekday_profile_consumption, ConsumptionGrid, WeekdayHourMedianProfile,
};
use crate::core::production::ProductionGrid;
use crate::core::reconciliation::reconcile;
use crate::errors::InputError;
use crate::input::{production_series_from_json, ProductionSeries};
use crate::output::Output;
use crate::read_consumption_file::{consumption_history_from_csv, MeterReading};
pub use crate::report::{Report, ReportFormat};
use anyhow::Context;
use std::fs::File;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Runs the whole yearly estimate: loads consumption and production, reconciles them hour by
/// hour and returns the report figures.
#[instrument(skip_all)]
pub fn run_simulation(config: &SimulationConfig) -> anyhow::Result<Report> {
    config.validate()?;

    let consumption = build_consumption_grid(&config.consumption)?;

    let mut production = ProductionGrid::new();
    for path in &config.production_files {
        production.ingest(&load_production_series(path)?);
    }

    let reconciliation = reconcile(
        &production,
        &consumption,
        config.inverter_power_limit as f64,
    );
    let report = Report::new(&reconciliation.totals, &config.savings_rate);
    if !report.is_complete() {
        warn!(
            undefined_hours = report.undefined_hours,
            "consumption was unknown for part of the year, consumption totals are not available"
        );
    }

    Ok(report)
}

/// Renders the report to the given output.
pub fn write_report(
    output: impl Output,
    report: &Report,
    format: ReportFormat,
) -> anyhow::Result<()> {
    if output.is_noop() {
        return Ok(());
    }
    report.write(format, output.writer()?)
}

/// Builds the consumption grid from the configured source. The history file is only read when
/// it is actually used.
pub fn build_consumption_grid(source: &ConsumptionSource) -> anyhow::Result<ConsumptionGrid> {
    Ok(match source {
        ConsumptionSource::Constant(watts) => {
            info!(watts, "using constant consumption");
            constant_consumption(*watts as f64)
        }
        ConsumptionSource::History {
            path,
            first_weekday,
        } => {
            let readings = load_consumption_history(path)?;
            let profile = WeekdayHourMedianProfile::from_readings(&readings);
            weekday_profile_consumption(&profile, *first_weekday)
        }
    })
}

fn load_production_series(path: &Path) -> anyhow::Result<ProductionSeries> {
    let file = File::open(path).map_err(|e| InputError::io(path, e))?;
    let series = production_series_from_json(file)
        .with_context(|| format!("Could not load PVGIS time series {}", path.display()))?;

    let inputs = series.inputs.as_ref();
    let location = inputs.and_then(|inputs| inputs.location.as_ref());
    let module = inputs.and_then(|inputs| inputs.pv_module.as_ref());
    info!(
        path = %path.display(),
        records = series.records.len(),
        latitude = location.map(|location| location.latitude),
        longitude = location.map(|location| location.longitude),
        elevation = location.and_then(|location| location.elevation),
        technology = module.and_then(|module| module.technology.as_deref()),
        peak_power = module.and_then(|module| module.peak_power),
        system_loss = module.and_then(|module| module.system_loss),
        "loaded PVGIS time series"
    );

    Ok(series)
}

fn load_consumption_history(path: &Path) -> anyhow::Result<Vec<MeterReading>> {
    let file = File::open(path).map_err(|e| InputError::io(path, e))?;
    let readings = consumption_history_from_csv(file)
        .with_context(|| format!("Could not load consumption history {}", path.display()))?;
    info!(
        path = %path.display(),
        readings = readings.len(),
        "loaded consumption history"
    );

    Ok(readings)
}
