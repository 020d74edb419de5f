//! Upload merge policy for stock readings and deliveries
//!
//! One reading per (date, item) is authoritative: a later upload replaces an
//! earlier one. Deliveries are never replaced; same-day deliveries add up.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::entities::{DeliveryRecord, StockReading};

/// Result of merging an upload into the master readings
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Merged readings ordered by (date, item)
    pub readings: Vec<StockReading>,
    /// Existing readings replaced by the upload
    pub conflicts_resolved: usize,
    /// Readings in the upload that had no earlier counterpart
    pub added: usize,
}

/// Collapse readings so the last one for each (date, item) wins
///
/// Returns the surviving readings in (date, item) order and how many were dropped.
pub fn dedupe_readings(readings: Vec<StockReading>) -> (Vec<StockReading>, usize) {
    let total = readings.len();
    let mut latest: BTreeMap<(NaiveDate, String), StockReading> = BTreeMap::new();
    for reading in readings {
        latest.insert((reading.date, reading.item_name.clone()), reading);
    }
    let kept: Vec<StockReading> = latest.into_values().collect();
    let dropped = total - kept.len();
    (kept, dropped)
}

/// Merge an uploaded batch into the existing readings, newest upload winning
pub fn merge_readings(existing: Vec<StockReading>, upload: Vec<StockReading>) -> MergeOutcome {
    let (existing, _) = dedupe_readings(existing);
    let (upload, _) = dedupe_readings(upload);

    let mut merged: BTreeMap<(NaiveDate, String), StockReading> = existing
        .into_iter()
        .map(|r| ((r.date, r.item_name.clone()), r))
        .collect();

    let mut conflicts_resolved = 0;
    let mut added = 0;
    for reading in upload {
        match merged.insert((reading.date, reading.item_name.clone()), reading) {
            Some(_) => conflicts_resolved += 1,
            None => added += 1,
        }
    }

    MergeOutcome {
        readings: merged.into_values().collect(),
        conflicts_resolved,
        added,
    }
}

/// Append uploaded deliveries, keeping (date, item) order and upload order within a day
pub fn append_deliveries(
    existing: Vec<DeliveryRecord>,
    upload: Vec<DeliveryRecord>,
) -> Vec<DeliveryRecord> {
    let mut all: Vec<DeliveryRecord> = existing.into_iter().chain(upload).collect();
    all.sort_by(|a, b| (a.date, &a.item_name).cmp(&(b.date, &b.item_name)));
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn test_newest_upload_wins() {
        let existing = vec![
            StockReading::new(day(1), "Milk", 10.0),
            StockReading::new(day(2), "Milk", 7.0),
        ];
        let upload = vec![
            StockReading::new(day(2), "Milk", 6.5),
            StockReading::new(day(3), "Milk", 5.0),
        ];

        let outcome = merge_readings(existing, upload);

        assert_eq!(outcome.conflicts_resolved, 1);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.readings.len(), 3);
        assert_eq!(outcome.readings[1].current_stock, 6.5);
    }

    #[test]
    fn test_duplicates_within_one_batch_keep_last() {
        let (kept, dropped) = dedupe_readings(vec![
            StockReading::new(day(1), "Milk", 10.0),
            StockReading::new(day(1), "Milk", 9.0),
        ]);
        assert_eq!(dropped, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].current_stock, 9.0);
    }

    #[test]
    fn test_deliveries_are_appended_not_replaced() {
        let existing = vec![DeliveryRecord::new(day(2), "Milk", 5.0)];
        let upload = vec![
            DeliveryRecord::new(day(2), "Milk", 3.0),
            DeliveryRecord::new(day(1), "Cups", 100.0),
        ];
        let all = append_deliveries(existing, upload);

        assert_eq!(all.len(), 3);
        assert_eq!(all[0].item_name, "Cups");
        assert_eq!(all[1].delivery_amount, 5.0);
        assert_eq!(all[2].delivery_amount, 3.0);
    }
}
