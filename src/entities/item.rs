//! Item entity - static catalog reference data per stocked item

use serde::{Deserialize, Serialize};

/// A catalog entry for a stocked item
///
/// `name` is the join key for every other dataset. It is case-sensitive and
/// unique within a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item name (join key)
    pub name: String,

    /// Counting unit (e.g., "L", "kg", "cups")
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Reorder point; stock below this is always flagged
    pub min_threshold: f64,

    /// Storage capacity; reorders fill up to this level
    pub max_capacity: f64,

    /// Supplier lead time in days
    pub lead_time_days: u32,

    /// Purchase cost for one unit
    #[serde(default)]
    pub cost_per_unit: f64,

    /// Supplier reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

fn default_unit() -> String {
    "units".to_string()
}

impl Item {
    /// Create a catalog entry with no cost or supplier information
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        min_threshold: f64,
        max_capacity: f64,
        lead_time_days: u32,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            min_threshold,
            max_capacity,
            lead_time_days,
            cost_per_unit: 0.0,
            supplier: None,
        }
    }

    /// Set the unit cost
    pub fn with_cost(mut self, cost_per_unit: f64) -> Self {
        self.cost_per_unit = cost_per_unit;
        self
    }

    /// Set the supplier reference
    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    /// Check field constraints, returning a description of the first violation
    pub fn check(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("item name is empty".to_string());
        }
        if !self.min_threshold.is_finite() || self.min_threshold < 0.0 {
            return Err(format!("min_threshold {} is negative", self.min_threshold));
        }
        if !self.max_capacity.is_finite() || self.max_capacity <= 0.0 {
            return Err(format!("max_capacity {} is not positive", self.max_capacity));
        }
        if self.min_threshold > self.max_capacity {
            return Err(format!(
                "min_threshold {} exceeds max_capacity {}",
                self.min_threshold, self.max_capacity
            ));
        }
        if !self.cost_per_unit.is_finite() || self.cost_per_unit < 0.0 {
            return Err(format!("cost_per_unit {} is negative", self.cost_per_unit));
        }
        Ok(())
    }
}
