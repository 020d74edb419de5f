//! Forecasting engine - rolling usage, runout projection and confidence
//!
//! Anomalous (negative) consumption records are excluded from the rolling
//! average and from the history depth, and the number excluded is reported
//! on each forecast. The average is the plain mean of the record values in
//! the window, and history depth counts the records present.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate};

use crate::core::config::AnalyticsConfig;
use crate::core::snapshot::Snapshot;
use crate::entities::{Confidence, ConsumptionRecord, ForecastRecord};

/// Forecast every catalog item, plus any uncatalogued item with records
///
/// Output is in item-name order with exactly one row per name.
pub fn forecast(
    snapshot: &Snapshot,
    consumption: &[ConsumptionRecord],
    config: &AnalyticsConfig,
    as_of: NaiveDate,
) -> Vec<ForecastRecord> {
    let join = snapshot.join();

    let mut by_item: BTreeMap<&str, Vec<&ConsumptionRecord>> = BTreeMap::new();
    for record in consumption {
        by_item.entry(record.item_name.as_str()).or_default().push(record);
    }

    let names: BTreeSet<&str> = snapshot
        .catalog()
        .iter()
        .map(|item| item.name.as_str())
        .chain(join.histories().iter().map(|h| h.name))
        .collect();

    let forecasts: Vec<ForecastRecord> = names
        .into_iter()
        .map(|name| {
            let latest = join.history(name).and_then(|h| h.latest_reading());
            let mut history = by_item.remove(name).unwrap_or_default();
            history.sort_by_key(|r| r.date);

            let mut record = forecast_item(name, &history, config, as_of);
            record.catalogued = snapshot.catalog().contains(name);
            if let Some(reading) = latest {
                project_runout(&mut record, reading.date, reading.current_stock);
            }
            tracing::debug!(
                item = name,
                avg = ?record.avg_daily_consumption,
                runout = ?record.projected_runout_date,
                confidence = %record.confidence_level,
                "forecast"
            );
            record
        })
        .collect();

    tracing::info!(items = forecasts.len(), "forecast complete");
    forecasts
}

/// Usage statistics for one item from its date-ordered consumption history
///
/// Runout fields are left unknown; [`project_runout`] fills them in once the
/// latest stock reading is known.
pub fn forecast_item(
    name: &str,
    history: &[&ConsumptionRecord],
    config: &AnalyticsConfig,
    as_of: NaiveDate,
) -> ForecastRecord {
    let mut record = ForecastRecord::unknown(name, true, as_of);

    let Some(latest) = history.last() else {
        return record;
    };

    let window = config.window();
    let window_start = latest
        .date
        .checked_sub_days(Days::new(u64::from(window - 1)))
        .unwrap_or(NaiveDate::MIN);
    let in_window: Vec<&ConsumptionRecord> = history
        .iter()
        .copied()
        .filter(|r| r.date >= window_start)
        .collect();

    let (included, excluded): (Vec<&ConsumptionRecord>, Vec<&ConsumptionRecord>) =
        in_window.into_iter().partition(|r| !r.anomaly);
    record.excluded_anomalies = excluded.len();
    record.data_points = included.len();

    if included.is_empty() {
        return record;
    }

    let values: Vec<f64> = included.iter().map(|r| r.consumption).collect();
    let total: f64 = values.iter().sum();
    record.avg_daily_consumption = Some(total / values.len() as f64);
    record.qualifying_days = u32::try_from(values.len()).unwrap_or(u32::MAX);

    record.variation = coefficient_of_variation(&values);
    record.trend_factor = trend_factor(&values);

    let mut confidence = if record.qualifying_days >= window {
        Confidence::High
    } else if record.qualifying_days * 2 >= window {
        Confidence::Medium
    } else {
        Confidence::Low
    };
    if record
        .variation
        .is_some_and(|cv| cv > config.variation_threshold)
    {
        confidence = confidence.downgrade();
    }
    record.confidence_level = confidence;

    record
}

/// Fill in runout fields from the latest reading
///
/// Runout stays unknown unless the average usage is positive.
pub fn project_runout(record: &mut ForecastRecord, reading_date: NaiveDate, current_stock: f64) {
    record.current_stock = Some(current_stock);
    record.last_reading_date = Some(reading_date);

    let Some(avg) = record.avg_daily_consumption.filter(|avg| *avg > 0.0) else {
        return;
    };

    let days_remaining = current_stock / avg;
    record.days_remaining = Some(days_remaining);
    record.projected_runout_date = reading_date.checked_add_days(Days::new(days_remaining.floor() as u64));
}

/// Population standard deviation over mean; undefined for fewer than two
/// values or a non-positive mean
fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return None;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt() / mean)
}

/// Mean of the newer half over the older half, clamped to [0.5, 2.0]
fn trend_factor(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 1.0;
    }
    let half = values.len() / 2;
    let (older, newer) = values.split_at(half);
    let older_avg = older.iter().sum::<f64>() / older.len() as f64;
    let newer_avg = newer.iter().sum::<f64>() / newer.len() as f64;
    if older_avg <= 0.0 {
        return 1.0;
    }
    (newer_avg / older_avg).clamp(0.5, 2.0)
}
