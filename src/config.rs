use crate::core::units::DAYS_PER_WEEK;
use crate::errors::ConfigError;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_SAVINGS_RATE_PER_KWH: f64 = 0.35;
pub const DEFAULT_CURRENCY: &str = "€";

/// Price put on each kWh that no longer has to be bought.
#[derive(Clone, Debug, PartialEq)]
pub struct SavingsRate {
    pub per_kwh: f64,
    pub currency: String,
}

impl Default for SavingsRate {
    fn default() -> Self {
        Self {
            per_kwh: DEFAULT_SAVINGS_RATE_PER_KWH,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// Where the household consumption comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ConsumptionSource {
    /// The same draw in W for every hour
    Constant(u32),
    /// Weekday/hour medians from an InfluxDB CSV export of per-phase readings
    History {
        path: PathBuf,
        /// Weekday assigned to 1st January, 0 = Sunday
        first_weekday: u32,
    },
}

impl ConsumptionSource {
    /// A constant consumption, when given, wins over a history file.
    pub fn from_options(
        constant_consumption: Option<u32>,
        consumption_history: Option<PathBuf>,
        first_weekday: u32,
    ) -> Result<Self, ConfigError> {
        match (constant_consumption, consumption_history) {
            (Some(watts), history) => {
                if let Some(path) = history {
                    info!(
                        path = %path.display(),
                        "constant consumption given, ignoring consumption history"
                    );
                }
                Ok(Self::Constant(watts))
            }
            (None, Some(path)) => Ok(Self::History {
                path,
                first_weekday,
            }),
            (None, None) => Err(ConfigError::MissingConsumptionSource),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// PVGIS hourly exports, one per array orientation
    pub production_files: Vec<PathBuf>,
    /// Maximum AC output of the inverter, in W
    pub inverter_power_limit: u32,
    pub consumption: ConsumptionSource,
    pub savings_rate: SavingsRate,
}

impl SimulationConfig {
    pub fn new(
        production_files: Vec<PathBuf>,
        inverter_power_limit: u32,
        consumption: ConsumptionSource,
    ) -> Self {
        Self {
            production_files,
            inverter_power_limit,
            consumption,
            savings_rate: SavingsRate::default(),
        }
    }

    pub fn with_savings_rate(mut self, savings_rate: SavingsRate) -> Self {
        self.savings_rate = savings_rate;
        self
    }

    /// Checks the settings before any file is read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.production_files.is_empty() {
            return Err(ConfigError::NoProductionSeries);
        }
        if self.inverter_power_limit == 0 {
            return Err(ConfigError::InvalidInverterLimit(self.inverter_power_limit));
        }
        match self.consumption {
            ConsumptionSource::Constant(0) => {
                return Err(ConfigError::InvalidConstantConsumption(0));
            }
            ConsumptionSource::History { first_weekday, .. } if first_weekday >= DAYS_PER_WEEK => {
                return Err(ConfigError::InvalidFirstWeekday(first_weekday));
            }
            _ => {}
        }
        let rate = self.savings_rate.per_kwh;
        if !rate.is_finite() || rate < 0. {
            return Err(ConfigError::InvalidSavingsRate(rate));
        }

        Ok(())
    }
}
