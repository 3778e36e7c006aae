use crate::calendar_grid::HourlyGrid;
use crate::core::units::{DAYS_PER_WEEK, HOURS_PER_DAY};
use crate::read_consumption_file::{MeterReading, Phase};
use crate::statistics::median;
use chrono::{Datelike, Timelike};
use tracing::{debug, warn};

/// Expected household draw in W for every hour of the year.
///
/// `None` marks an hour for which the consumption could not be determined, because the
/// historical data had no samples for it.
pub type ConsumptionGrid = HourlyGrid<Option<f64>>;

const SLOTS: usize = (DAYS_PER_WEEK * HOURS_PER_DAY) as usize;

/// Typical whole-house power draw for each weekday/hour slot, built from metered history.
///
/// Weekdays are numbered from Sunday = 0 to Saturday = 6. Each slot holds the sum of the
/// per-phase medians of all readings taken in that weekday and hour.
#[derive(Clone, Debug, PartialEq)]
pub struct WeekdayHourMedianProfile {
    slots: Vec<Option<f64>>,
}

impl WeekdayHourMedianProfile {
    pub fn from_readings(readings: &[MeterReading]) -> Self {
        let mut samples: Vec<[Vec<f64>; 3]> = vec![Default::default(); SLOTS];

        for reading in readings {
            let weekday = reading.timestamp.weekday().num_days_from_sunday();
            let hour = reading.timestamp.hour();
            samples[slot_index(weekday, hour)][reading.phase.index()].push(reading.value);
        }

        // a phase without samples has no median, which leaves the whole slot undefined
        let slots = samples
            .iter()
            .map(|phases| {
                Phase::ALL
                    .iter()
                    .map(|phase| median(&phases[phase.index()]))
                    .sum::<Option<f64>>()
            })
            .collect::<Vec<_>>();

        let profile = Self { slots };
        debug!(
            readings = readings.len(),
            undefined_slots = profile.undefined_slots().count(),
            "built weekday/hour median profile"
        );

        profile
    }

    /// Power for a weekday (0 = Sunday) and hour, or `None` when history was too sparse.
    pub fn get(&self, weekday: u32, hour_of_day: u32) -> Option<f64> {
        if weekday >= DAYS_PER_WEEK || hour_of_day >= HOURS_PER_DAY {
            return None;
        }
        self.slots[slot_index(weekday, hour_of_day)]
    }

    /// Weekday/hour pairs without a value.
    pub fn undefined_slots(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(idx, _)| {
                let idx = idx as u32;
                (idx / HOURS_PER_DAY, idx % HOURS_PER_DAY)
            })
    }
}

fn slot_index(weekday: u32, hour_of_day: u32) -> usize {
    (weekday * HOURS_PER_DAY + hour_of_day) as usize
}

/// Every hour of the year consumes the same power.
pub fn constant_consumption(watts: f64) -> ConsumptionGrid {
    HourlyGrid::filled(Some(watts))
}

/// Lays the weekday/hour profile out over the year.
///
/// Day 1 is given `first_weekday` and the weekday then advances by one per day, wrapping after
/// Saturday. This is not aligned to any real calendar year.
pub fn weekday_profile_consumption(
    profile: &WeekdayHourMedianProfile,
    first_weekday: u32,
) -> ConsumptionGrid {
    let grid = HourlyGrid::from_fn(|key| {
        let weekday = (first_weekday + key.day_of_year() - 1) % DAYS_PER_WEEK;
        profile.get(weekday, key.hour_of_day())
    });

    let undefined_hours = grid.values().iter().filter(|v| v.is_none()).count();
    if undefined_hours > 0 {
        warn!(
            undefined_hours,
            "consumption history has no samples for some weekday/hour/phase slots; totals depending on them will be undefined"
        );
    }

    grid
}
