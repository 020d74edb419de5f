//! Stock count and delivery records - the user-supplied source data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single stock count for one item on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReading {
    pub date: NaiveDate,
    pub item_name: String,
    pub current_stock: f64,
}

impl StockReading {
    pub fn new(date: NaiveDate, item_name: impl Into<String>, current_stock: f64) -> Self {
        Self {
            date,
            item_name: item_name.into(),
            current_stock,
        }
    }
}

/// A delivery received for one item on one date
///
/// Several deliveries may share a (date, item) pair; they add up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub date: NaiveDate,
    pub item_name: String,
    pub delivery_amount: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DeliveryRecord {
    pub fn new(date: NaiveDate, item_name: impl Into<String>, delivery_amount: f64) -> Self {
        Self {
            date,
            item_name: item_name.into(),
            delivery_amount,
            notes: None,
        }
    }
}
