//! Integrity auditor - validates stock, delivery and consumption data
//!
//! The audit is a pure pass over a [`Snapshot`] plus, optionally, a stored
//! consumption dataset. It never mutates its inputs and never aborts on a bad
//! row: every problem becomes an [`AuditFinding`].

use std::collections::HashMap;

use chrono::{Days, NaiveDate};

use crate::core::config::AnalyticsConfig;
use crate::core::join::ItemHistory;
use crate::core::snapshot::Snapshot;
use crate::core::text::fmt_qty;
use crate::entities::{AuditFinding, ConsumptionRecord, RuleId, Severity};

/// Run every audit rule and return findings in display order
pub fn audit(
    snapshot: &Snapshot,
    stored_consumption: Option<&[ConsumptionRecord]>,
    config: &AnalyticsConfig,
    as_of: NaiveDate,
) -> Vec<AuditFinding> {
    let mut findings: Vec<AuditFinding> = snapshot
        .rejected()
        .iter()
        .map(|skipped| skipped.to_finding())
        .collect();

    let join = snapshot.join();
    let mut expected: HashMap<(&str, NaiveDate), Recomputed> = HashMap::new();

    for history in join.histories() {
        check_references(history, &mut findings);
        check_readings(history, config, &mut findings, &mut expected);
        if history.item.is_some() {
            check_freshness(history, config, as_of, &mut findings);
        }
    }

    for item in &join.catalog_only {
        findings.push(no_readings(&item.name));
    }
    for history in &join.matched {
        if history.readings.is_empty() {
            findings.push(no_readings(history.name));
        }
    }

    if let Some(stored) = stored_consumption {
        check_stored_consumption(stored, &expected, config, &mut findings);
    }

    findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let critical = findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count();
    tracing::info!(findings = findings.len(), critical, "audit complete");
    findings
}

/// Independently recomputed values for one counted date
#[derive(Debug, Clone, Copy)]
struct Recomputed {
    previous_stock: f64,
    delivered: f64,
    current_stock: f64,
}

impl Recomputed {
    fn consumption(&self) -> f64 {
        self.previous_stock + self.delivered - self.current_stock
    }
}

fn no_readings(name: &str) -> AuditFinding {
    AuditFinding::new(
        RuleId::NoReadings,
        Some(name),
        None,
        format!("'{}' is in the catalog but has never been counted", name),
    )
}

fn check_references(history: &ItemHistory<'_>, findings: &mut Vec<AuditFinding>) {
    if history.item.is_some() {
        return;
    }

    if let Some(latest) = history.latest_reading() {
        findings.push(AuditFinding::new(
            RuleId::StockUnknownItem,
            Some(history.name),
            Some(latest.date),
            format!(
                "{} stock reading(s) for '{}', which is not in the item catalog",
                history.readings.len(),
                history.name
            ),
        ));
    }

    for delivery in &history.deliveries {
        findings.push(AuditFinding::new(
            RuleId::DeliveryUnknownItem,
            Some(history.name),
            Some(delivery.date),
            format!(
                "Delivery of {} recorded for '{}', which is not in the item catalog",
                fmt_qty(delivery.delivery_amount),
                history.name
            ),
        ));
    }
}

fn check_readings<'a>(
    history: &ItemHistory<'a>,
    config: &AnalyticsConfig,
    findings: &mut Vec<AuditFinding>,
    expected: &mut HashMap<(&'a str, NaiveDate), Recomputed>,
) {
    if let Some(item) = history.item {
        for reading in &history.readings {
            if reading.current_stock > item.max_capacity {
                findings.push(AuditFinding::new(
                    RuleId::OverCapacity,
                    Some(history.name),
                    Some(reading.date),
                    format!(
                        "Counted {} {} but declared capacity is {}",
                        fmt_qty(reading.current_stock),
                        item.unit,
                        fmt_qty(item.max_capacity)
                    ),
                ));
            }
        }
    }

    for pair in history.readings.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);
        let delivered: f64 = history
            .deliveries
            .iter()
            .filter(|d| d.date > prev.date && d.date <= cur.date)
            .map(|d| d.delivery_amount)
            .sum();
        let recomputed = Recomputed {
            previous_stock: prev.current_stock,
            delivered,
            current_stock: cur.current_stock,
        };
        expected.insert((history.name, cur.date), recomputed);

        let consumption = recomputed.consumption();
        if consumption < 0.0 {
            findings.push(AuditFinding::new(
                RuleId::NegativeConsumption,
                Some(history.name),
                Some(cur.date),
                format!(
                    "Consumption computes to {} ({} + {} - {}): stock rose without a recorded delivery, possible miscount",
                    fmt_qty(consumption),
                    fmt_qty(prev.current_stock),
                    fmt_qty(delivered),
                    fmt_qty(cur.current_stock)
                ),
            ));
        }

        let gap = (cur.date - prev.date).num_days();
        let delivered_between = history
            .deliveries
            .iter()
            .any(|d| d.date > prev.date && d.date < cur.date);
        if gap > i64::from(config.gap_warning_days) && !delivered_between {
            findings.push(AuditFinding::new(
                RuleId::ReadingGap,
                Some(history.name),
                Some(cur.date),
                format!(
                    "{} days since the previous count on {} with no delivery in between",
                    gap, prev.date
                ),
            ));
        }

        if let Some(item) = history.item {
            let decrease = prev.current_stock - cur.current_stock;
            if decrease > item.max_capacity {
                findings.push(AuditFinding::new(
                    RuleId::ImpossibleDecrease,
                    Some(history.name),
                    Some(cur.date),
                    format!(
                        "Stock fell by {} (from {} to {}), more than the declared capacity of {}",
                        fmt_qty(decrease),
                        fmt_qty(prev.current_stock),
                        fmt_qty(cur.current_stock),
                        fmt_qty(item.max_capacity)
                    ),
                ));
            }
        }
    }
}

fn check_freshness(
    history: &ItemHistory<'_>,
    config: &AnalyticsConfig,
    as_of: NaiveDate,
    findings: &mut Vec<AuditFinding>,
) {
    let Some(latest) = history.latest_reading() else {
        return;
    };
    let cutoff = as_of
        .checked_sub_days(Days::new(u64::from(config.staleness_days)))
        .unwrap_or(NaiveDate::MIN);
    if latest.date < cutoff {
        findings.push(AuditFinding::new(
            RuleId::StaleReadings,
            Some(history.name),
            Some(latest.date),
            format!(
                "Last counted {} days before {} (staleness threshold {} days)",
                (as_of - latest.date).num_days(),
                as_of,
                config.staleness_days
            ),
        ));
    }
}

fn check_stored_consumption(
    stored: &[ConsumptionRecord],
    expected: &HashMap<(&str, NaiveDate), Recomputed>,
    config: &AnalyticsConfig,
    findings: &mut Vec<AuditFinding>,
) {
    let tolerance = config.consistency_tolerance;

    for record in stored {
        let Some(recomputed) = expected.get(&(record.item_name.as_str(), record.date)) else {
            findings.push(AuditFinding::new(
                RuleId::OrphanedConsumption,
                Some(&record.item_name),
                Some(record.date),
                "Stored consumption has no pair of stock readings behind it".to_string(),
            ));
            continue;
        };

        let mut problems = Vec::new();

        let self_total = record.previous_stock + record.delivery_amount - record.current_stock;
        if (self_total - record.consumption).abs() > tolerance {
            problems.push(format!(
                "stored fields give {} + {} - {} = {}, not {}",
                fmt_qty(record.previous_stock),
                fmt_qty(record.delivery_amount),
                fmt_qty(record.current_stock),
                fmt_qty(self_total),
                fmt_qty(record.consumption)
            ));
        }

        let independent = recomputed.consumption();
        if (independent - record.consumption).abs() > tolerance {
            problems.push(format!(
                "source data gives {} + {} - {} = {}, stored value is {}",
                fmt_qty(recomputed.previous_stock),
                fmt_qty(recomputed.delivered),
                fmt_qty(recomputed.current_stock),
                fmt_qty(independent),
                fmt_qty(record.consumption)
            ));
        }

        if !problems.is_empty() {
            findings.push(AuditFinding::new(
                RuleId::ConsumptionMismatch,
                Some(&record.item_name),
                Some(record.date),
                format!("Consumption self-check failed: {}", problems.join("; ")),
            ));
        }
    }
}
