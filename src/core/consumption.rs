//! Consumption deriver - turns stock counts and deliveries into usage records
//!
//! For consecutive counted dates `prev < cur` of one item:
//!
//! ```text
//! consumption = prev.stock + Σ deliveries(prev < date <= cur) - cur.stock
//! ```
//!
//! Gaps between counts widen the interval; the total is not spread over the
//! missing days. The first reading of an item yields no record. Negative
//! results are kept and flagged, never clipped.

use crate::core::join::{ItemHistory, JoinResult};
use crate::core::text::fmt_qty;
use crate::entities::ConsumptionRecord;

/// Derive consumption for every item with readings, ordered by item then date
pub fn derive_consumption(join: &JoinResult<'_>) -> Vec<ConsumptionRecord> {
    let records: Vec<ConsumptionRecord> = join
        .histories()
        .into_iter()
        .flat_map(derive_for_item)
        .collect();
    tracing::info!(records = records.len(), "derived consumption");
    records
}

/// Derive consumption for a single item
pub fn derive_for_item(history: &ItemHistory<'_>) -> Vec<ConsumptionRecord> {
    let mut records = Vec::with_capacity(history.readings.len().saturating_sub(1));
    let mut next_delivery = 0;

    for pair in history.readings.windows(2) {
        let (prev, cur) = (pair[0], pair[1]);

        // Deliveries on or before the previous count are already in its stock
        while next_delivery < history.deliveries.len()
            && history.deliveries[next_delivery].date <= prev.date
        {
            next_delivery += 1;
        }
        let mut delivered = 0.0;
        while next_delivery < history.deliveries.len()
            && history.deliveries[next_delivery].date <= cur.date
        {
            delivered += history.deliveries[next_delivery].delivery_amount;
            next_delivery += 1;
        }

        let consumption = prev.current_stock + delivered - cur.current_stock;
        let interval_days = u32::try_from((cur.date - prev.date).num_days()).unwrap_or(u32::MAX);
        let anomaly = consumption < 0.0;

        let mut reasoning = if delivered > 0.0 {
            format!(
                "Started with {}, received {} in deliveries, ended with {}",
                fmt_qty(prev.current_stock),
                fmt_qty(delivered),
                fmt_qty(cur.current_stock)
            )
        } else {
            format!(
                "Started with {}, no deliveries, ended with {}",
                fmt_qty(prev.current_stock),
                fmt_qty(cur.current_stock)
            )
        };
        if interval_days > 1 {
            reasoning.push_str(&format!(" over {} days since {}", interval_days, prev.date));
        }
        if anomaly {
            reasoning = format!(
                "ANOMALY: stock rose {} beyond recorded deliveries (possible miscount or missing delivery). {}",
                fmt_qty(-consumption),
                reasoning
            );
            tracing::debug!(item = history.name, date = %cur.date, consumption, "negative consumption");
        }

        records.push(ConsumptionRecord {
            date: cur.date,
            item_name: history.name.to_string(),
            consumption,
            previous_stock: prev.current_stock,
            delivery_amount: delivered,
            current_stock: cur.current_stock,
            interval_days,
            anomaly,
            reasoning,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use crate::core::join::join_by_name;
    use crate::entities::{DeliveryRecord, Item, StockReading};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn derive(readings: &[StockReading], deliveries: &[DeliveryRecord]) -> Vec<ConsumptionRecord> {
        let catalog = Catalog::from_items([Item::new("Milk", "L", 3.0, 30.0, 1)]);
        derive_consumption(&join_by_name(&catalog, readings, deliveries))
    }

    #[test]
    fn test_first_reading_yields_no_record() {
        let records = derive(&[StockReading::new(day(1), "Milk", 10.0)], &[]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_delivery_on_current_day_is_counted() {
        let records = derive(
            &[
                StockReading::new(day(1), "Milk", 10.0),
                StockReading::new(day(2), "Milk", 7.0),
            ],
            &[DeliveryRecord::new(day(2), "Milk", 5.0)],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].consumption, 8.0);
        assert_eq!(records[0].delivery_amount, 5.0);
        assert!(!records[0].anomaly);
        assert_eq!(
            records[0].reasoning,
            "Started with 10, received 5 in deliveries, ended with 7"
        );
    }

    #[test]
    fn test_same_day_deliveries_are_summed() {
        let records = derive(
            &[
                StockReading::new(day(1), "Milk", 10.0),
                StockReading::new(day(2), "Milk", 12.0),
            ],
            &[
                DeliveryRecord::new(day(2), "Milk", 3.0),
                DeliveryRecord::new(day(2), "Milk", 4.0),
            ],
        );
        assert_eq!(records[0].delivery_amount, 7.0);
        assert_eq!(records[0].consumption, 5.0);
    }

    #[test]
    fn test_gap_widens_interval_without_spreading() {
        let records = derive(
            &[
                StockReading::new(day(1), "Milk", 20.0),
                StockReading::new(day(4), "Milk", 8.0),
            ],
            &[
                DeliveryRecord::new(day(1), "Milk", 50.0),
                DeliveryRecord::new(day(3), "Milk", 6.0),
            ],
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].interval_days, 3);
        // day(1) delivery belongs to the day(1) count, not the interval
        assert_eq!(records[0].consumption, 20.0 + 6.0 - 8.0);
        assert!(records[0].reasoning.contains("over 3 days since 2025-08-01"));
    }

    #[test]
    fn test_negative_consumption_is_flagged_not_clipped() {
        let records = derive(
            &[
                StockReading::new(day(1), "Milk", 5.0),
                StockReading::new(day(2), "Milk", 9.0),
            ],
            &[],
        );
        assert_eq!(records[0].consumption, -4.0);
        assert!(records[0].anomaly);
        assert!(records[0].reasoning.starts_with("ANOMALY"));
    }

    #[test]
    fn test_items_are_independent_and_ordered() {
        let readings = vec![
            StockReading::new(day(2), "Milk", 8.0),
            StockReading::new(day(1), "Cups", 100.0),
            StockReading::new(day(1), "Milk", 10.0),
            StockReading::new(day(2), "Cups", 90.0),
            StockReading::new(day(3), "Cups", 70.0),
        ];
        let records = derive(&readings, &[DeliveryRecord::new(day(2), "Cups", 1.0)]);

        let keys: Vec<(&str, NaiveDate)> = records
            .iter()
            .map(|r| (r.item_name.as_str(), r.date))
            .collect();
        assert_eq!(
            keys,
            vec![("Cups", day(2)), ("Cups", day(3)), ("Milk", day(2))]
        );
        assert_eq!(records[2].consumption, 2.0, "Cups delivery does not leak into Milk");
    }
}
