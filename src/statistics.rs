//! A simple statistics module for summarising metered samples.
use statrs::statistics::{Data, Median};

/// Median of the samples, or `None` when there are none to take a median of.
pub fn median(numbers: &[f64]) -> Option<f64> {
    if numbers.is_empty() {
        return None;
    }
    let data = Data::new(numbers.to_vec());

    Some(data.median())
}
