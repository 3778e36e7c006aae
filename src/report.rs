use crate::config::SavingsRate;
use crate::core::reconciliation::RunningTotals;
use crate::core::units::{round_to_decimals, watt_hours_to_kilowatt_hours};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::io::Write;

/// Rendering of the yearly report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ReportFormat {
    /// Six human-readable lines
    #[default]
    Text,
    /// One JSON object
    Json,
}

/// Yearly figures in whole kWh, plus the money saved.
///
/// Figures that depend on consumption are `None` when the consumption of some hours was unknown.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub consumed_without_pv_kwh: Option<i64>,
    pub consumed_with_pv_kwh: Option<i64>,
    pub energy_saved_kwh: Option<i64>,
    pub estimated_savings: Option<f64>,
    pub currency: String,
    pub not_consumed_kwh: Option<i64>,
    pub inverter_loss_kwh: i64,
    pub undefined_hours: usize,
}

impl Report {
    pub fn new(totals: &RunningTotals, savings_rate: &SavingsRate) -> Self {
        let consumed_without_pv_kwh = totals
            .consumed_without_pv()
            .map(watt_hours_to_kilowatt_hours);
        let consumed_with_pv_kwh = totals
            .consumed_with_pv()
            .map(watt_hours_to_kilowatt_hours);

        // saved energy is taken from the already rounded figures
        let energy_saved_kwh = consumed_without_pv_kwh
            .zip(consumed_with_pv_kwh)
            .map(|(without_pv, with_pv)| without_pv - with_pv);
        let estimated_savings = energy_saved_kwh
            .map(|saved| round_to_decimals(saved as f64 * savings_rate.per_kwh, 2));

        Self {
            consumed_without_pv_kwh,
            consumed_with_pv_kwh,
            energy_saved_kwh,
            estimated_savings,
            currency: savings_rate.currency.clone(),
            not_consumed_kwh: totals.not_consumed().map(watt_hours_to_kilowatt_hours),
            inverter_loss_kwh: watt_hours_to_kilowatt_hours(totals.inverter_loss()),
            undefined_hours: totals.undefined_hours(),
        }
    }

    /// Whether every figure could be calculated.
    pub fn is_complete(&self) -> bool {
        self.undefined_hours == 0
    }

    pub fn write(&self, format: ReportFormat, mut writer: impl Write) -> anyhow::Result<()> {
        match format {
            ReportFormat::Text => write!(writer, "{self}")?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, self)?;
                writeln!(writer)?;
            }
        }
        writer.flush()?;

        Ok(())
    }
}

struct Figure<T>(Option<T>);

impl<T: Display> Display for Figure<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "{value}"),
            None => write!(f, "n/a"),
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let savings = self.estimated_savings.map(|savings| format!("{savings:.2}"));

        writeln!(f)?;
        writeln!(
            f,
            "Yearly power consumption without PV: {} kwh",
            Figure(self.consumed_without_pv_kwh)
        )?;
        writeln!(
            f,
            "Yearly power consumption with PV: {} kwh",
            Figure(self.consumed_with_pv_kwh)
        )?;
        writeln!(f)?;
        writeln!(f, "Energy saved: {} kwh", Figure(self.energy_saved_kwh))?;
        writeln!(f, "Estimated savings: {} {}", Figure(savings), self.currency)?;
        writeln!(f)?;
        writeln!(f, "Energy not consumed: {} kwh", Figure(self.not_consumed_kwh))?;
        writeln!(
            f,
            "Energy lost by inverter limit: {} kwh",
            self.inverter_loss_kwh
        )?;
        if !self.is_complete() {
            writeln!(f)?;
            writeln!(
                f,
                "Consumption unknown for {} hours: the consumption history has no samples for some weekday, hour and phase combinations",
                self.undefined_hours
            )?;
        }

        Ok(())
    }
}
