//! Inventory status summary

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::catalog::Catalog;
use crate::entities::{AuditFinding, ForecastRecord, RecommendationRecord, Severity, Urgency};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UrgencyCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

/// One-screen overview of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub as_of: NaiveDate,
    pub total_items: usize,
    /// Catalog items whose latest count is at or below the minimum threshold
    pub low_stock_items: Vec<String>,
    /// Catalog items that have never been counted
    pub unmeasured_items: Vec<String>,
    pub recommendations: UrgencyCounts,
    pub findings: SeverityCounts,
}

impl StatusSummary {
    pub fn build(
        catalog: &Catalog,
        forecasts: &[ForecastRecord],
        recommendations: &[RecommendationRecord],
        findings: &[AuditFinding],
        as_of: NaiveDate,
    ) -> Self {
        let mut low_stock_items = Vec::new();
        let mut unmeasured_items = Vec::new();

        for forecast in forecasts {
            let Some(item) = catalog.get(&forecast.item_name) else {
                continue;
            };
            match forecast.current_stock {
                Some(stock) if stock <= item.min_threshold => {
                    low_stock_items.push(item.name.clone())
                }
                Some(_) => {}
                None => unmeasured_items.push(item.name.clone()),
            }
        }

        let mut by_urgency = UrgencyCounts::default();
        for rec in recommendations {
            match rec.urgency {
                Urgency::Critical => by_urgency.critical += 1,
                Urgency::High => by_urgency.high += 1,
                Urgency::Medium => by_urgency.medium += 1,
                Urgency::Low => by_urgency.low += 1,
                Urgency::None => {}
            }
        }

        let mut by_severity = SeverityCounts::default();
        for finding in findings {
            match finding.severity {
                Severity::Critical => by_severity.critical += 1,
                Severity::Warning => by_severity.warning += 1,
                Severity::Info => by_severity.info += 1,
            }
        }

        Self {
            as_of,
            total_items: catalog.len(),
            low_stock_items,
            unmeasured_items,
            recommendations: by_urgency,
            findings: by_severity,
        }
    }

    /// Number of recommendations that need an order placed now
    pub fn actionable(&self) -> usize {
        self.recommendations.critical + self.recommendations.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Item, RuleId};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn test_summary_counts() {
        let catalog = Catalog::from_items([
            Item::new("Milk", "L", 3.0, 30.0, 1),
            Item::new("Cups", "pcs", 50.0, 500.0, 2),
            Item::new("Lids", "pcs", 50.0, 500.0, 2),
        ]);

        let mut milk = ForecastRecord::unknown("Milk", true, day(5));
        milk.current_stock = Some(3.0);
        let mut cups = ForecastRecord::unknown("Cups", true, day(5));
        cups.current_stock = Some(200.0);
        let lids = ForecastRecord::unknown("Lids", true, day(5));

        let rec = RecommendationRecord {
            item_name: "Milk".into(),
            urgency: Urgency::Critical,
            current_stock: 3.0,
            projected_runout_date: Some(day(5)),
            suggested_quantity: 27.0,
            unit: "L".into(),
            estimated_cost: 0.0,
            supplier: None,
            reasoning_text: String::new(),
            generated_at: day(5),
        };
        let findings = vec![
            AuditFinding::new(RuleId::NoReadings, Some("Lids"), None, "never counted"),
            AuditFinding::new(RuleId::NegativeStock, Some("Cups"), Some(day(2)), "below zero"),
        ];

        let summary =
            StatusSummary::build(&catalog, &[cups, lids, milk], &[rec], &findings, day(5));

        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.low_stock_items, vec!["Milk".to_string()]);
        assert_eq!(summary.unmeasured_items, vec!["Lids".to_string()]);
        assert_eq!(summary.recommendations.critical, 1);
        assert_eq!(summary.actionable(), 1);
        assert_eq!(summary.findings.critical, 1);
        assert_eq!(summary.findings.info, 1);
    }
}
