use crate::calendar_grid::{CalendarGrid, HourlyGrid};
use crate::core::consumption::ConsumptionGrid;
use crate::core::production::ProductionGrid;
use tracing::{debug, instrument};

/// How one hour of production and consumption settles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HourBalance {
    /// Production after the inverter cap, in W
    pub clipped_production: f64,
    /// Production above the inverter cap, in W
    pub inverter_loss: f64,
    /// Consumption still drawn from the grid, in W. `None` if consumption is unknown.
    pub consumed_with_pv: Option<f64>,
    /// Production exceeding consumption, in W. `None` if consumption is unknown.
    pub not_consumed: Option<f64>,
}

/// Settles a single hour: caps production at the inverter limit, then nets it against
/// consumption. Exactly one of `consumed_with_pv` and `not_consumed` is non-zero, unless
/// production and consumption match.
pub fn reconcile_hour(
    production: f64,
    consumption: Option<f64>,
    inverter_limit: f64,
) -> HourBalance {
    let (clipped_production, inverter_loss) = if production > inverter_limit {
        (inverter_limit, production - inverter_limit)
    } else {
        (production, 0.)
    };

    let (consumed_with_pv, not_consumed) = match consumption {
        Some(consumption) => {
            let net = consumption - clipped_production;
            if net >= 0. {
                (Some(net), Some(0.))
            } else {
                (Some(0.), Some(-net))
            }
        }
        None => (None, None),
    };

    HourBalance {
        clipped_production,
        inverter_loss,
        consumed_with_pv,
        not_consumed,
    }
}

/// Yearly sums in Wh (each hour contributes its power for one hour).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RunningTotals {
    consumed_without_pv: f64,
    consumed_with_pv: f64,
    not_consumed: f64,
    inverter_loss: f64,
    undefined_hours: usize,
}

impl RunningTotals {
    fn add(&mut self, consumption: Option<f64>, balance: &HourBalance) {
        self.inverter_loss += balance.inverter_loss;
        match (consumption, balance.consumed_with_pv, balance.not_consumed) {
            (Some(consumption), Some(consumed_with_pv), Some(not_consumed)) => {
                self.consumed_without_pv += consumption;
                self.consumed_with_pv += consumed_with_pv;
                self.not_consumed += not_consumed;
            }
            _ => self.undefined_hours += 1,
        }
    }

    /// Consumption with no PV installed. `None` if any hour had unknown consumption.
    pub fn consumed_without_pv(&self) -> Option<f64> {
        self.defined(self.consumed_without_pv)
    }

    /// Consumption still drawn from the grid with PV. `None` if any hour had unknown consumption.
    pub fn consumed_with_pv(&self) -> Option<f64> {
        self.defined(self.consumed_with_pv)
    }

    /// Production that could not be used. `None` if any hour had unknown consumption.
    pub fn not_consumed(&self) -> Option<f64> {
        self.defined(self.not_consumed)
    }

    pub fn inverter_loss(&self) -> f64 {
        self.inverter_loss
    }

    /// Hours skipped because their consumption was unknown.
    pub fn undefined_hours(&self) -> usize {
        self.undefined_hours
    }

    fn defined(&self, total: f64) -> Option<f64> {
        (self.undefined_hours == 0).then_some(total)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Reconciliation {
    pub totals: RunningTotals,
    /// Production as seen after the inverter cap
    pub clipped_production: HourlyGrid<f64>,
}

/// Walks every hour of the year in order and accumulates the yearly totals.
///
/// Works on its own copy of the production grid; neither input is modified.
#[instrument(skip(production, consumption))]
pub fn reconcile(
    production: &ProductionGrid,
    consumption: &ConsumptionGrid,
    inverter_limit: f64,
) -> Reconciliation {
    let mut clipped_production = production.grid().clone();
    let mut totals = RunningTotals::default();

    for key in CalendarGrid::keys() {
        let balance = reconcile_hour(clipped_production[key], consumption[key], inverter_limit);
        clipped_production[key] = balance.clipped_production;
        totals.add(consumption[key], &balance);
    }

    debug!(?totals, "reconciled production against consumption");

    Reconciliation {
        totals,
        clipped_production,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar_grid::HourKey;
    use crate::core::consumption::constant_consumption;
    use crate::input::{ProductionRecord, ProductionSeries};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::*;

    const LIMIT: f64 = 1000.;

    #[rstest]
    fn should_clip_before_netting() {
        let balance = reconcile_hour(1500., Some(1200.), LIMIT);

        assert_eq!(
            balance,
            HourBalance {
                clipped_production: 1000.,
                inverter_loss: 500.,
                consumed_with_pv: Some(200.),
                not_consumed: Some(0.),
            }
        );
    }

    #[rstest]
    fn should_count_overproduction_as_not_consumed() {
        let balance = reconcile_hour(300., Some(100.), LIMIT);

        assert_eq!(
            balance,
            HourBalance {
                clipped_production: 300.,
                inverter_loss: 0.,
                consumed_with_pv: Some(0.),
                not_consumed: Some(200.),
            }
        );
    }

    #[rstest]
    fn should_treat_exact_limit_as_unclipped() {
        let balance = reconcile_hour(1000., Some(1000.), LIMIT);

        assert_eq!(balance.inverter_loss, 0.);
        assert_eq!(balance.consumed_with_pv, Some(0.));
        assert_eq!(balance.not_consumed, Some(0.));
    }

    #[rstest]
    fn should_still_clip_when_consumption_unknown() {
        let balance = reconcile_hour(1800., None, LIMIT);

        assert_eq!(balance.clipped_production, 1000.);
        assert_eq!(balance.inverter_loss, 800.);
        assert_eq!(balance.consumed_with_pv, None);
        assert_eq!(balance.not_consumed, None);
    }

    #[rstest]
    #[case(0., 0.)]
    #[case(250., 400.)]
    #[case(400., 250.)]
    #[case(999.9, 10.)]
    #[case(4000., 1500.)]
    #[case(4000., 0.)]
    fn should_partition_difference_into_offset_or_waste(
        #[case] production: f64,
        #[case] consumption: f64,
    ) {
        let balance = reconcile_hour(production, Some(consumption), LIMIT);
        let offset = balance.consumed_with_pv.unwrap();
        let waste = balance.not_consumed.unwrap();

        assert!(balance.clipped_production <= LIMIT);
        assert_relative_eq!(balance.inverter_loss, (production - LIMIT).max(0.));
        assert!(offset == 0. || waste == 0.);
        assert_relative_eq!(consumption - balance.clipped_production, offset - waste);
    }

    fn production_grid(cells: &[(u32, u32, f64)]) -> ProductionGrid {
        let records = cells
            .iter()
            .map(|(day, hour, power)| ProductionRecord {
                timestamp: NaiveDate::from_yo_opt(2020, *day)
                    .unwrap()
                    .and_hms_opt(*hour, 10, 0)
                    .unwrap(),
                power: *power,
            })
            .collect();
        let mut grid = ProductionGrid::new();
        grid.ingest(&ProductionSeries::new(records));
        grid
    }

    #[rstest]
    fn should_accumulate_totals_over_the_year() {
        let production = production_grid(&[(1, 12, 1500.), (2, 12, 300.), (366, 13, 350.)]);
        let consumption = constant_consumption(350.);

        let reconciliation = reconcile(&production, &consumption, LIMIT);
        let totals = reconciliation.totals;

        assert_relative_eq!(totals.consumed_without_pv().unwrap(), 350. * 8784.);
        // fully offset at day 1 12:00 and day 366 13:00, 50 W left at day 2 12:00
        assert_relative_eq!(totals.consumed_with_pv().unwrap(), 350. * 8781. + 50.);
        assert_relative_eq!(totals.not_consumed().unwrap(), 650.);
        assert_relative_eq!(totals.inverter_loss(), 500.);
        assert_eq!(totals.undefined_hours(), 0);
    }

    #[rstest]
    fn should_not_modify_production_input() {
        let production = production_grid(&[(100, 11, 2500.)]);
        let before = production.clone();

        let reconciliation = reconcile(&production, &constant_consumption(0.), LIMIT);

        assert_eq!(production, before);
        assert_eq!(
            reconciliation.clipped_production[HourKey::new(100, 11).unwrap()],
            LIMIT
        );
        assert!(reconciliation
            .clipped_production
            .values()
            .iter()
            .all(|power| *power <= LIMIT));
    }

    #[rstest]
    fn should_never_increase_consumption_with_pv() {
        let production = production_grid(&[(10, 10, 800.), (10, 11, 1200.), (200, 14, 5000.)]);
        let consumption =
            ConsumptionGrid::from_fn(|key| Some(100. + key.hour_of_day() as f64 * 20.));

        let totals = reconcile(&production, &consumption, LIMIT).totals;

        assert!(totals.consumed_without_pv().unwrap() >= totals.consumed_with_pv().unwrap());
    }

    #[rstest]
    fn should_mark_totals_undefined_when_consumption_missing() {
        let production = production_grid(&[(5, 12, 1300.)]);
        let consumption = ConsumptionGrid::from_fn(|key| {
            (key.day_of_year() != 3 || key.hour_of_day() != 8).then_some(200.)
        });

        let totals = reconcile(&production, &consumption, LIMIT).totals;

        assert_eq!(totals.undefined_hours(), 1);
        assert_eq!(totals.consumed_without_pv(), None);
        assert_eq!(totals.consumed_with_pv(), None);
        assert_eq!(totals.not_consumed(), None);
        assert_relative_eq!(totals.inverter_loss(), 300.);
    }

    #[rstest]
    fn should_give_identical_totals_on_repeated_runs() {
        let production = production_grid(&[(1, 12, 1500.), (180, 12, 720.)]);
        let consumption = constant_consumption(350.);

        let first = reconcile(&production, &consumption, LIMIT);
        let second = reconcile(&production, &consumption, LIMIT);

        assert_eq!(first, second);
    }
}
