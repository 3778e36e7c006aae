use crate::calendar_grid::{HourKey, HourlyGrid};
use crate::input::ProductionSeries;
use tracing::debug;

/// PV output in W per hour of the year, summed over every ingested series.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductionGrid {
    power: HourlyGrid<f64>,
}

impl Default for ProductionGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductionGrid {
    /// An empty grid with every hour at zero.
    pub fn new() -> Self {
        Self {
            power: HourlyGrid::filled(0.),
        }
    }

    /// Adds a series onto the grid.
    ///
    /// Every record lands in the cell for its day of year and hour, whatever the year. Repeated
    /// timestamps, within one series or across several, all contribute.
    pub fn ingest(&mut self, series: &ProductionSeries) {
        for record in &series.records {
            self.power[HourKey::from_timestamp(&record.timestamp)] += record.power;
        }
        debug!(
            records = series.records.len(),
            total_power = series.total_power(),
            "ingested production series"
        );
    }

    pub fn power(&self, key: HourKey) -> f64 {
        self.power[key]
    }

    pub fn grid(&self) -> &HourlyGrid<f64> {
        &self.power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ProductionRecord;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn record(year: i32, month: u32, day: u32, hour: u32, power: f64) -> ProductionRecord {
        ProductionRecord {
            timestamp: NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, 10, 0)
                .unwrap(),
            power,
        }
    }

    #[fixture]
    fn south_facing() -> ProductionSeries {
        ProductionSeries::new(vec![
            record(2020, 1, 1, 11, 150.),
            record(2020, 1, 1, 12, 210.),
            record(2020, 6, 21, 13, 640.5),
            record(2020, 12, 31, 12, 90.),
        ])
    }

    #[rstest]
    fn should_start_zeroed() {
        let grid = ProductionGrid::new();

        assert!(grid.grid().values().iter().all(|power| *power == 0.));
    }

    #[rstest]
    fn should_place_records_by_day_of_year_and_hour(south_facing: ProductionSeries) {
        let mut grid = ProductionGrid::new();
        grid.ingest(&south_facing);

        assert_relative_eq!(grid.power(HourKey::new(1, 11).unwrap()), 150.);
        assert_relative_eq!(grid.power(HourKey::new(1, 12).unwrap()), 210.);
        assert_relative_eq!(grid.power(HourKey::new(173, 13).unwrap()), 640.5);
        assert_relative_eq!(grid.power(HourKey::new(366, 12).unwrap()), 90.);
        assert_relative_eq!(grid.grid().values().iter().sum::<f64>(), 1090.5);
    }

    #[rstest]
    fn should_double_when_ingesting_same_series_twice(south_facing: ProductionSeries) {
        let mut once = ProductionGrid::new();
        once.ingest(&south_facing);
        let mut twice = ProductionGrid::new();
        twice.ingest(&south_facing);
        twice.ingest(&south_facing);

        for (key, power) in once.grid().iter() {
            assert_relative_eq!(twice.power(key), 2. * power);
        }
    }

    #[rstest]
    fn should_sum_orientations(south_facing: ProductionSeries) {
        let east_facing = ProductionSeries::new(vec![record(2020, 1, 1, 11, 50.)]);
        let mut grid = ProductionGrid::new();
        grid.ingest(&south_facing);
        grid.ingest(&east_facing);

        assert_relative_eq!(grid.power(HourKey::new(1, 11).unwrap()), 200.);
    }

    #[rstest]
    fn should_never_fill_day_366_from_a_common_year() {
        let series = ProductionSeries::new(vec![
            record(2019, 12, 31, 12, 80.),
            record(2019, 3, 1, 12, 120.),
        ]);
        let mut grid = ProductionGrid::new();
        grid.ingest(&series);

        assert_relative_eq!(grid.power(HourKey::new(365, 12).unwrap()), 80.);
        assert_relative_eq!(grid.power(HourKey::new(60, 12).unwrap()), 120.);
        assert_eq!(grid.power(HourKey::new(366, 12).unwrap()), 0.);
    }

    #[rstest]
    fn should_keep_duplicate_timestamps() {
        let series = ProductionSeries::new(vec![
            record(2020, 5, 5, 9, 100.),
            record(2020, 5, 5, 9, 100.),
        ]);
        let mut grid = ProductionGrid::new();
        grid.ingest(&series);

        assert_relative_eq!(grid.power(HourKey::new(126, 9).unwrap()), 200.);
    }
}
