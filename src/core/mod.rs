pub mod consumption;
pub mod production;
pub mod reconciliation;
pub mod units;
