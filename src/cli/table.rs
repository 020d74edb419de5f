//! Table rows for terminal output

use tabled::Tabled;

use crate::cli::helpers::truncate_str;
use crate::core::text::{fmt_date_or, fmt_qty};
use crate::entities::{AuditFinding, ConsumptionRecord, ForecastRecord, RecommendationRecord};

fn opt_qty(value: Option<f64>) -> String {
    value.map(fmt_qty).unwrap_or_else(|| "unknown".to_string())
}

#[derive(Tabled)]
pub struct ConsumptionRow {
    #[tabled(rename = "DATE")]
    pub date: String,
    #[tabled(rename = "ITEM")]
    pub item: String,
    #[tabled(rename = "USED")]
    pub consumption: String,
    #[tabled(rename = "DAYS")]
    pub interval_days: u32,
    #[tabled(rename = "REASONING")]
    pub reasoning: String,
}

impl From<&ConsumptionRecord> for ConsumptionRow {
    fn from(r: &ConsumptionRecord) -> Self {
        Self {
            date: r.date.to_string(),
            item: truncate_str(&r.item_name, 24),
            consumption: fmt_qty(r.consumption),
            interval_days: r.interval_days,
            reasoning: truncate_str(&r.reasoning, 72),
        }
    }
}

#[derive(Tabled)]
pub struct ForecastRow {
    #[tabled(rename = "ITEM")]
    pub item: String,
    #[tabled(rename = "STOCK")]
    pub stock: String,
    #[tabled(rename = "AVG/DAY")]
    pub avg: String,
    #[tabled(rename = "DAYS LEFT")]
    pub days_remaining: String,
    #[tabled(rename = "RUNOUT")]
    pub runout: String,
    #[tabled(rename = "CONFIDENCE")]
    pub confidence: String,
    #[tabled(rename = "POINTS")]
    pub data_points: usize,
    #[tabled(rename = "TREND")]
    pub trend: String,
}

impl From<&ForecastRecord> for ForecastRow {
    fn from(f: &ForecastRecord) -> Self {
        let item = if f.catalogued {
            f.item_name.clone()
        } else {
            format!("{} (uncatalogued)", f.item_name)
        };
        Self {
            item: truncate_str(&item, 32),
            stock: opt_qty(f.current_stock),
            avg: opt_qty(f.avg_daily_consumption),
            days_remaining: opt_qty(f.days_remaining),
            runout: fmt_date_or(f.projected_runout_date, "unknown"),
            confidence: f.confidence_level.to_string(),
            data_points: f.data_points,
            trend: format!("x{}", fmt_qty(f.trend_factor)),
        }
    }
}

#[derive(Tabled)]
pub struct RecommendationRow {
    #[tabled(rename = "URGENCY")]
    pub urgency: String,
    #[tabled(rename = "ITEM")]
    pub item: String,
    #[tabled(rename = "STOCK")]
    pub stock: String,
    #[tabled(rename = "RUNOUT")]
    pub runout: String,
    #[tabled(rename = "ORDER")]
    pub quantity: String,
    #[tabled(rename = "COST")]
    pub cost: String,
    #[tabled(rename = "SUPPLIER")]
    pub supplier: String,
}

impl From<&RecommendationRecord> for RecommendationRow {
    fn from(r: &RecommendationRecord) -> Self {
        Self {
            urgency: r.urgency.to_string(),
            item: truncate_str(&r.item_name, 24),
            stock: format!("{} {}", fmt_qty(r.current_stock), r.unit),
            runout: fmt_date_or(r.projected_runout_date, "unknown"),
            quantity: format!("{} {}", fmt_qty(r.suggested_quantity), r.unit),
            cost: format!("{:.2}", r.estimated_cost),
            supplier: r.supplier.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct FindingRow {
    #[tabled(rename = "SEVERITY")]
    pub severity: String,
    #[tabled(rename = "RULE")]
    pub rule: String,
    #[tabled(rename = "ITEM")]
    pub item: String,
    #[tabled(rename = "DATE")]
    pub date: String,
    #[tabled(rename = "MESSAGE")]
    pub message: String,
}

impl From<&AuditFinding> for FindingRow {
    fn from(f: &AuditFinding) -> Self {
        Self {
            severity: f.severity.to_string(),
            rule: f.rule_id.to_string(),
            item: f.item_name.clone().unwrap_or_default(),
            date: fmt_date_or(f.date, ""),
            message: truncate_str(&f.message, 80),
        }
    }
}
