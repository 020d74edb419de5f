//! Recommendation generator - urgency-ranked purchase suggestions
//!
//! Urgency compares the projected runout date against `today` plus a multiple
//! of the supplier lead time. Stock below the minimum threshold is at least
//! `Low` whatever the runout estimate says. Items missing from the catalog or
//! never counted are not recommended.

use chrono::{Days, NaiveDate};

use crate::core::catalog::Catalog;
use crate::core::config::AnalyticsConfig;
use crate::core::text::{fmt_date_or, fmt_qty};
use crate::entities::{ForecastRecord, Item, RecommendationRecord, Urgency};

/// Generate recommendations ordered by urgency, then runout date, then name
pub fn recommend(
    forecasts: &[ForecastRecord],
    catalog: &Catalog,
    config: &AnalyticsConfig,
    today: NaiveDate,
) -> Vec<RecommendationRecord> {
    let mut recommendations: Vec<RecommendationRecord> = forecasts
        .iter()
        .filter_map(|forecast| {
            let item = catalog.get(&forecast.item_name)?;
            let current_stock = forecast.current_stock?;
            let (urgency, rule) = classify(forecast, item, current_stock, config, today);
            if urgency == Urgency::None && !config.include_healthy {
                return None;
            }
            Some(build(forecast, item, current_stock, urgency, &rule, today))
        })
        .collect();

    recommendations.sort_by(|a, b| {
        a.urgency
            .rank()
            .cmp(&b.urgency.rank())
            .then_with(|| runout_order(a.projected_runout_date, b.projected_runout_date))
            .then_with(|| a.item_name.cmp(&b.item_name))
    });

    if let Some(budget) = config.budget_ceiling {
        apply_budget(&mut recommendations, catalog, budget);
    }

    tracing::info!(count = recommendations.len(), "recommendations generated");
    recommendations
}

/// Known runout dates sort before unknown ones
fn runout_order(a: Option<NaiveDate>, b: Option<NaiveDate>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

/// `today + ceil(lead_time × multiplier)` days
fn horizon(today: NaiveDate, lead_time_days: u32, multiplier: f64) -> NaiveDate {
    let days = (f64::from(lead_time_days) * multiplier.max(0.0)).ceil() as u64;
    today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Decide urgency and describe the rule that produced it
pub fn classify(
    forecast: &ForecastRecord,
    item: &Item,
    current_stock: f64,
    config: &AnalyticsConfig,
    today: NaiveDate,
) -> (Urgency, String) {
    let m = &config.urgency_multipliers;
    let levels = [
        (Urgency::Critical, m.critical),
        (Urgency::High, m.high),
        (Urgency::Medium, m.medium),
    ];

    if let Some(runout) = forecast.projected_runout_date {
        for (urgency, multiplier) in levels {
            let limit = horizon(today, item.lead_time_days, multiplier);
            if runout <= limit {
                return (
                    urgency,
                    format!(
                        "projected runout {} is on or before today + {} x lead time ({}), so {}",
                        runout,
                        fmt_qty(multiplier),
                        limit,
                        urgency
                    ),
                );
            }
        }
    }

    let outlook = match forecast.projected_runout_date {
        Some(runout) => format!(
            "projected runout {} is after today + {} x lead time ({})",
            runout,
            fmt_qty(m.medium),
            horizon(today, item.lead_time_days, m.medium)
        ),
        None => "no runout can be projected".to_string(),
    };

    if current_stock < item.min_threshold {
        (
            Urgency::Low,
            format!(
                "{}, but current stock {} is below the minimum threshold {}, so Low",
                outlook,
                fmt_qty(current_stock),
                fmt_qty(item.min_threshold)
            ),
        )
    } else {
        (
            Urgency::None,
            format!("{} and stock is at or above the minimum threshold, so no action needed", outlook),
        )
    }
}

fn build(
    forecast: &ForecastRecord,
    item: &Item,
    current_stock: f64,
    urgency: Urgency,
    rule: &str,
    today: NaiveDate,
) -> RecommendationRecord {
    let suggested_quantity = if urgency == Urgency::None {
        0.0
    } else {
        (item.max_capacity - current_stock).max(0.0)
    };

    let usage = match forecast.avg_daily_consumption {
        Some(avg) => format!("{} {}/day", fmt_qty(avg), item.unit),
        None => "unknown".to_string(),
    };

    let mut reasoning_text = format!(
        "Current stock: {} {}. Average daily usage: {}. Projected runout: {}. Lead time: {} day(s). Rule: {}.",
        fmt_qty(current_stock),
        item.unit,
        usage,
        fmt_date_or(forecast.projected_runout_date, "insufficient data"),
        item.lead_time_days,
        rule
    );
    if suggested_quantity > 0.0 {
        reasoning_text.push_str(&format!(
            " Suggested order fills to capacity {} {}.",
            fmt_qty(item.max_capacity),
            item.unit
        ));
    }

    RecommendationRecord {
        item_name: item.name.clone(),
        urgency,
        current_stock,
        projected_runout_date: forecast.projected_runout_date,
        suggested_quantity,
        unit: item.unit.clone(),
        estimated_cost: suggested_quantity * item.cost_per_unit,
        supplier: item.supplier.clone(),
        reasoning_text,
        generated_at: today,
    }
}

/// Cap quantities so total spend stays within `budget`, most urgent first
///
/// Capped quantities are rounded down to whole units.
fn apply_budget(recommendations: &mut [RecommendationRecord], catalog: &Catalog, budget: f64) {
    let mut remaining = budget.max(0.0);

    for rec in recommendations.iter_mut() {
        let Some(item) = catalog.get(&rec.item_name) else {
            continue;
        };
        if item.cost_per_unit <= 0.0 || rec.suggested_quantity <= 0.0 {
            continue;
        }

        if rec.estimated_cost > remaining {
            let affordable = (remaining / item.cost_per_unit).floor().max(0.0);
            rec.reasoning_text.push_str(&format!(
                " Quantity capped from {} to {} {} by the remaining budget of {}.",
                fmt_qty(rec.suggested_quantity),
                fmt_qty(affordable),
                rec.unit,
                fmt_qty(remaining)
            ));
            rec.suggested_quantity = affordable;
            rec.estimated_cost = affordable * item.cost_per_unit;
        }
        remaining = (remaining - rec.estimated_cost).max(0.0);
    }
}
