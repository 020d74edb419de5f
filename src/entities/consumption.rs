//! Consumption record - derived net usage between two stock counts

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Net quantity of an item used between the previous count and `date`
///
/// Always satisfies
/// `consumption == previous_stock + delivery_amount - current_stock`.
/// Negative values are kept and marked with `anomaly`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub date: NaiveDate,
    pub item_name: String,
    pub consumption: f64,

    /// Stock at the previous counted date
    pub previous_stock: f64,

    /// Deliveries after the previous count, up to and including `date`
    pub delivery_amount: f64,

    /// Stock counted on `date`
    pub current_stock: f64,

    /// Calendar days since the previous count (at least 1)
    pub interval_days: u32,

    /// Stock rose without a matching delivery
    pub anomaly: bool,

    pub reasoning: String,
}
