use crate::core::units::{DAYS_IN_LEAP_YEAR, HOURS_PER_DAY};
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::ops::{Index, IndexMut};

/// Number of cells in a leap-year sized hourly grid (366 x 24).
pub const GRID_CELLS: usize = (DAYS_IN_LEAP_YEAR * HOURS_PER_DAY) as usize;

/// Address of a single hour in the simulated year.
///
/// Days are numbered from 1 (1st January) to 366, hours from 0 to 23. Day 366 always exists,
/// whatever the year the input data came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HourKey {
    day_of_year: u32,
    hour_of_day: u32,
}

impl HourKey {
    /// Returns `None` when the key lies outside the calendar grid.
    pub fn new(day_of_year: u32, hour_of_day: u32) -> Option<Self> {
        CalendarGrid::contains(day_of_year, hour_of_day).then_some(Self {
            day_of_year,
            hour_of_day,
        })
    }

    /// The cell a local timestamp falls into. Minutes are dropped.
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        Self {
            day_of_year: timestamp.ordinal(),
            hour_of_day: timestamp.hour(),
        }
    }

    pub fn day_of_year(&self) -> u32 {
        self.day_of_year
    }

    pub fn hour_of_day(&self) -> u32 {
        self.hour_of_day
    }

    /// Offset of this key in a flat grid.
    pub fn index(&self) -> usize {
        ((self.day_of_year - 1) * HOURS_PER_DAY + self.hour_of_day) as usize
    }

    fn from_index(index: usize) -> Self {
        let index = index as u32;
        Self {
            day_of_year: index / HOURS_PER_DAY + 1,
            hour_of_day: index % HOURS_PER_DAY,
        }
    }
}

/// The fixed key space {1..366} x {0..23}.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarGrid;

impl CalendarGrid {
    pub fn contains(day_of_year: u32, hour_of_day: u32) -> bool {
        (1..=DAYS_IN_LEAP_YEAR).contains(&day_of_year) && hour_of_day < HOURS_PER_DAY
    }

    /// All keys, day ascending then hour ascending.
    pub fn keys() -> impl Iterator<Item = HourKey> {
        (0..GRID_CELLS).map(HourKey::from_index)
    }

    pub fn days() -> impl Iterator<Item = u32> {
        1..=DAYS_IN_LEAP_YEAR
    }
}

/// A value for every cell of the calendar grid, stored as one flat array.
#[derive(Clone, Debug, PartialEq)]
pub struct HourlyGrid<T> {
    cells: Vec<T>,
}

impl<T: Clone> HourlyGrid<T> {
    pub fn filled(value: T) -> Self {
        Self {
            cells: vec![value; GRID_CELLS],
        }
    }
}

impl<T> HourlyGrid<T> {
    /// Builds a grid by evaluating `f` for every key in grid order.
    pub fn from_fn(f: impl FnMut(HourKey) -> T) -> Self {
        Self {
            cells: CalendarGrid::keys().map(f).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (HourKey, &T)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(idx, value)| (HourKey::from_index(idx), value))
    }

    pub fn values(&self) -> &[T] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<T> Index<HourKey> for HourlyGrid<T> {
    type Output = T;

    fn index(&self, key: HourKey) -> &Self::Output {
        &self.cells[key.index()]
    }
}

impl<T> IndexMut<HourKey> for HourlyGrid<T> {
    fn index_mut(&mut self, key: HourKey) -> &mut Self::Output {
        &mut self.cells[key.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(1, 0, true)]
    #[case(366, 23, true)]
    #[case(0, 0, false)]
    #[case(367, 0, false)]
    #[case(1, 24, false)]
    fn should_check_membership(#[case] day: u32, #[case] hour: u32, #[case] expected: bool) {
        assert_eq!(CalendarGrid::contains(day, hour), expected);
        assert_eq!(HourKey::new(day, hour).is_some(), expected);
    }

    #[rstest]
    fn should_enumerate_every_cell_in_order() {
        let keys = CalendarGrid::keys().collect::<Vec<_>>();

        assert_eq!(keys.len(), 8784);
        assert_eq!(keys[0], HourKey::new(1, 0).unwrap());
        assert_eq!(keys[23], HourKey::new(1, 23).unwrap());
        assert_eq!(keys[24], HourKey::new(2, 0).unwrap());
        assert_eq!(keys[8783], HourKey::new(366, 23).unwrap());
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[rstest]
    fn should_round_trip_flat_index() {
        for (idx, key) in CalendarGrid::keys().enumerate() {
            assert_eq!(key.index(), idx);
        }
    }

    #[rstest]
    fn should_index_grid_by_key() {
        let mut grid = HourlyGrid::filled(0.);
        let key = HourKey::new(42, 13).unwrap();
        grid[key] += 12.5;

        assert_eq!(grid[key], 12.5);
        assert_eq!(grid.values().iter().filter(|v| **v != 0.).count(), 1);
        assert_eq!(grid.len(), GRID_CELLS);
    }
}
