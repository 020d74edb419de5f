//! Audit finding - one detected data-integrity issue

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Finding severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

/// Audit rule that produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RuleId {
    /// Row could not be turned into a typed record
    #[serde(rename = "row.malformed")]
    MalformedRow,
    /// Stock count below zero
    #[serde(rename = "stock.negative")]
    NegativeStock,
    /// Stock fell by more than the item can hold
    #[serde(rename = "stock.impossible_decrease")]
    ImpossibleDecrease,
    /// Stored consumption disagrees with an independent recomputation
    #[serde(rename = "consumption.mismatch")]
    ConsumptionMismatch,
    /// Stored consumption has no stock reading pair behind it
    #[serde(rename = "consumption.orphaned")]
    OrphanedConsumption,
    #[serde(rename = "delivery.unknown_item")]
    DeliveryUnknownItem,
    #[serde(rename = "stock.unknown_item")]
    StockUnknownItem,
    /// Long gap between counts with no delivery in between
    #[serde(rename = "stock.gap")]
    ReadingGap,
    #[serde(rename = "consumption.negative")]
    NegativeConsumption,
    #[serde(rename = "stock.over_capacity")]
    OverCapacity,
    #[serde(rename = "item.no_readings")]
    NoReadings,
    #[serde(rename = "item.stale")]
    StaleReadings,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::MalformedRow => "row.malformed",
            RuleId::NegativeStock => "stock.negative",
            RuleId::ImpossibleDecrease => "stock.impossible_decrease",
            RuleId::ConsumptionMismatch => "consumption.mismatch",
            RuleId::OrphanedConsumption => "consumption.orphaned",
            RuleId::DeliveryUnknownItem => "delivery.unknown_item",
            RuleId::StockUnknownItem => "stock.unknown_item",
            RuleId::ReadingGap => "stock.gap",
            RuleId::NegativeConsumption => "consumption.negative",
            RuleId::OverCapacity => "stock.over_capacity",
            RuleId::NoReadings => "item.no_readings",
            RuleId::StaleReadings => "item.stale",
        }
    }

    /// Fixed severity for each rule
    pub fn severity(&self) -> Severity {
        match self {
            RuleId::MalformedRow
            | RuleId::NegativeStock
            | RuleId::ImpossibleDecrease
            | RuleId::ConsumptionMismatch
            | RuleId::OrphanedConsumption => Severity::Critical,
            RuleId::DeliveryUnknownItem
            | RuleId::StockUnknownItem
            | RuleId::ReadingGap
            | RuleId::NegativeConsumption
            | RuleId::OverCapacity => Severity::Warning,
            RuleId::NoReadings | RuleId::StaleReadings => Severity::Info,
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A structured data-integrity report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFinding {
    pub severity: Severity,
    pub item_name: Option<String>,
    pub date: Option<NaiveDate>,
    pub message: String,
    pub rule_id: RuleId,
}

impl AuditFinding {
    /// Create a finding; severity follows from the rule
    pub fn new(
        rule_id: RuleId,
        item_name: Option<&str>,
        date: Option<NaiveDate>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: rule_id.severity(),
            item_name: item_name.map(str::to_string),
            date,
            message: message.into(),
            rule_id,
        }
    }

    /// Display order: severity, item, date, rule, message
    pub fn sort_key(&self) -> (Severity, Option<&str>, Option<NaiveDate>, RuleId, &str) {
        (
            self.severity,
            self.item_name.as_deref(),
            self.date,
            self.rule_id,
            self.message.as_str(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_follows_rule() {
        let f = AuditFinding::new(RuleId::NegativeStock, Some("Milk"), None, "below zero");
        assert_eq!(f.severity, Severity::Critical);
        let f = AuditFinding::new(RuleId::ReadingGap, Some("Milk"), None, "gap");
        assert_eq!(f.severity, Severity::Warning);
        let f = AuditFinding::new(RuleId::StaleReadings, None, None, "stale");
        assert_eq!(f.severity, Severity::Info);
    }

    #[test]
    fn test_rule_id_serializes_as_code() {
        let json = serde_json::to_string(&RuleId::ImpossibleDecrease).unwrap();
        assert_eq!(json, "\"stock.impossible_decrease\"");
    }

    #[test]
    fn test_severity_orders_critical_first() {
        assert!(Severity::Critical < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
    }
}
