//! Forecast record - rolling usage, runout projection and confidence per item

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Qualitative reliability of a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// One level lower, saturating at `Low`
    pub fn downgrade(self) -> Self {
        match self {
            Confidence::High => Confidence::Medium,
            Confidence::Medium | Confidence::Low => Confidence::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "High"),
            Confidence::Medium => write!(f, "Medium"),
            Confidence::Low => write!(f, "Low"),
        }
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(format!("Unknown confidence level: {}", s)),
        }
    }
}

/// Forecast for a single item as of one pipeline run
///
/// Optional fields are `None` when history is insufficient; that is reported
/// as "unknown", never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub item_name: String,

    /// False when the item only appears in readings or deliveries
    pub catalogued: bool,

    /// Stock at the most recent reading
    pub current_stock: Option<f64>,

    /// Date of the most recent reading
    pub last_reading_date: Option<NaiveDate>,

    /// Mean of the consumption records in the trailing window
    pub avg_daily_consumption: Option<f64>,

    /// Days of stock left at the average rate
    pub days_remaining: Option<f64>,

    pub projected_runout_date: Option<NaiveDate>,

    pub confidence_level: Confidence,

    /// Consumption records averaged
    pub data_points: usize,

    /// Counted days in the window with usable consumption
    pub qualifying_days: u32,

    /// Negative records left out of the average
    pub excluded_anomalies: usize,

    /// Coefficient of variation of the consumption values
    pub variation: Option<f64>,

    /// Newer half of the window relative to the older half, in [0.5, 2.0]
    pub trend_factor: f64,

    pub as_of_date: NaiveDate,
}

impl ForecastRecord {
    /// A forecast row for an item with no usable history
    pub fn unknown(item_name: impl Into<String>, catalogued: bool, as_of_date: NaiveDate) -> Self {
        Self {
            item_name: item_name.into(),
            catalogued,
            current_stock: None,
            last_reading_date: None,
            avg_daily_consumption: None,
            days_remaining: None,
            projected_runout_date: None,
            confidence_level: Confidence::Low,
            data_points: 0,
            qualifying_days: 0,
            excluded_anomalies: 0,
            variation: None,
            trend_factor: 1.0,
            as_of_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downgrade_floors_at_low() {
        assert_eq!(Confidence::High.downgrade(), Confidence::Medium);
        assert_eq!(Confidence::Medium.downgrade(), Confidence::Low);
        assert_eq!(Confidence::Low.downgrade(), Confidence::Low);
    }

    #[test]
    fn test_confidence_parse() {
        assert_eq!("HIGH".parse::<Confidence>().unwrap(), Confidence::High);
        assert!("certain".parse::<Confidence>().is_err());
    }
}
