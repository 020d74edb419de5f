//! Recommendation record - urgency-ranked purchase suggestion

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Purchase priority, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    /// Runs out before an order placed today could arrive
    Critical,
    High,
    Medium,
    Low,
    /// No action needed; only emitted when healthy items are requested
    None,
}

impl Urgency {
    /// Sort rank, 0 is most urgent
    pub fn rank(self) -> u8 {
        match self {
            Urgency::Critical => 0,
            Urgency::High => 1,
            Urgency::Medium => 2,
            Urgency::Low => 3,
            Urgency::None => 4,
        }
    }

    pub fn all() -> &'static [Urgency] {
        &[
            Urgency::Critical,
            Urgency::High,
            Urgency::Medium,
            Urgency::Low,
            Urgency::None,
        ]
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Critical => write!(f, "Critical"),
            Urgency::High => write!(f, "High"),
            Urgency::Medium => write!(f, "Medium"),
            Urgency::Low => write!(f, "Low"),
            Urgency::None => write!(f, "None"),
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Urgency::Critical),
            "high" => Ok(Urgency::High),
            "medium" => Ok(Urgency::Medium),
            "low" => Ok(Urgency::Low),
            "none" => Ok(Urgency::None),
            _ => Err(format!("Unknown urgency: {}", s)),
        }
    }
}

/// A purchase suggestion for one catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub item_name: String,
    pub urgency: Urgency,
    pub current_stock: f64,
    pub projected_runout_date: Option<NaiveDate>,
    pub suggested_quantity: f64,
    pub unit: String,
    pub estimated_cost: f64,

    #[serde(default)]
    pub supplier: Option<String>,

    /// Current stock, usage, runout, lead time and the urgency rule, in that order
    pub reasoning_text: String,

    pub generated_at: NaiveDate,
}
