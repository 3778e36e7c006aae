pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_WEEK: u32 = 7;
pub const DAYS_IN_LEAP_YEAR: u32 = 366;

/// Converts an hourly accumulation of Watts (i.e. Wh) into whole kWh.
///
/// Rounds half to even, so 2500 Wh gives 2 kWh and 3500 Wh gives 4 kWh.
pub fn watt_hours_to_kilowatt_hours(watt_hours: f64) -> i64 {
    (watt_hours / WATTS_PER_KILOWATT as f64).round_ties_even() as i64
}

/// Rounds to a fixed number of decimal places, half to even.
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
