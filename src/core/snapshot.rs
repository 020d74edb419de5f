//! Versioned immutable snapshot of the source data
//!
//! Each pipeline stage receives a `&Snapshot` and never mutates it. New data
//! produces a new snapshot which the [`SnapshotHost`] swaps in atomically.

use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::core::catalog::Catalog;
use crate::core::join::{join_by_name, JoinResult};
use crate::core::merge::dedupe_readings;
use crate::core::rows::{check_delivery, check_reading, RowResult, RowSource, SkippedRow};
use crate::entities::{DeliveryRecord, Item, StockReading};

/// Source data as handed over by the persistence layer, one result per row
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub items: Vec<RowResult<Item>>,
    /// Readings in upload order; later rows supersede earlier ones
    pub stock: Vec<RowResult<StockReading>>,
    pub deliveries: Vec<RowResult<DeliveryRecord>>,
}

impl SourceData {
    /// Wrap already-typed records
    pub fn from_records(
        items: Vec<Item>,
        stock: Vec<StockReading>,
        deliveries: Vec<DeliveryRecord>,
    ) -> Self {
        Self {
            items: items.into_iter().map(Ok).collect(),
            stock: stock.into_iter().map(Ok).collect(),
            deliveries: deliveries.into_iter().map(Ok).collect(),
        }
    }
}

/// Screened, immutable input for one pipeline run
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: u64,
    fingerprint: String,
    catalog: Catalog,
    readings: Vec<StockReading>,
    deliveries: Vec<DeliveryRecord>,
    rejected: Vec<SkippedRow>,
    superseded_readings: usize,
}

impl Snapshot {
    /// Screen every row and build the snapshot
    pub fn build(version: u64, source: SourceData) -> Self {
        let (catalog, mut rejected) = Catalog::build(source.items);

        let mut readings = Vec::new();
        for row in source.stock {
            match row.and_then(|r| screen(r, RowSource::Stock, check_reading)) {
                Ok(reading) => readings.push(reading),
                Err(skip) => rejected.push(skip),
            }
        }
        let (readings, superseded_readings) = dedupe_readings(readings);

        let mut deliveries = Vec::new();
        for row in source.deliveries {
            match row.and_then(|d| screen(d, RowSource::Delivery, check_delivery)) {
                Ok(delivery) => deliveries.push(delivery),
                Err(skip) => rejected.push(skip),
            }
        }
        deliveries.sort_by(|a, b| (a.date, &a.item_name).cmp(&(b.date, &b.item_name)));

        if !rejected.is_empty() {
            tracing::warn!(count = rejected.len(), "rows skipped while building snapshot");
        }

        let fingerprint = fingerprint(&catalog, &readings, &deliveries);
        tracing::debug!(version, %fingerprint, "snapshot built");

        Self {
            version,
            fingerprint,
            catalog,
            readings,
            deliveries,
            rejected,
            superseded_readings,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// SHA-256 over the screened inputs; equal inputs give equal fingerprints
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Accepted readings, one per (date, item), in (date, item) order
    pub fn readings(&self) -> &[StockReading] {
        &self.readings
    }

    /// Accepted deliveries in (date, item) order
    pub fn deliveries(&self) -> &[DeliveryRecord] {
        &self.deliveries
    }

    /// Rows left out, each reported as a finding by the auditor
    pub fn rejected(&self) -> &[SkippedRow] {
        &self.rejected
    }

    /// Readings dropped because a later row had the same (date, item)
    pub fn superseded_readings(&self) -> usize {
        self.superseded_readings
    }

    pub fn join(&self) -> JoinResult<'_> {
        join_by_name(&self.catalog, &self.readings, &self.deliveries)
    }
}

/// Re-check a typed record; rows built in code skip the text parser
fn screen<T>(
    record: T,
    source: RowSource,
    check: impl Fn(&T) -> Result<(), crate::core::rows::SkipReason>,
) -> RowResult<T>
where
    T: Keyed,
{
    match check(&record) {
        Ok(()) => Ok(record),
        Err(reason) => Err(SkippedRow {
            source,
            line: None,
            item_name: Some(record.item_name().to_string()),
            date: Some(record.date()),
            reason,
        }),
    }
}

trait Keyed {
    fn item_name(&self) -> &str;
    fn date(&self) -> chrono::NaiveDate;
}

impl Keyed for StockReading {
    fn item_name(&self) -> &str {
        &self.item_name
    }
    fn date(&self) -> chrono::NaiveDate {
        self.date
    }
}

impl Keyed for DeliveryRecord {
    fn item_name(&self) -> &str {
        &self.item_name
    }
    fn date(&self) -> chrono::NaiveDate {
        self.date
    }
}

fn fingerprint(catalog: &Catalog, readings: &[StockReading], deliveries: &[DeliveryRecord]) -> String {
    let mut hasher = Sha256::new();
    for item in catalog.iter() {
        hasher.update(format!(
            "item\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            item.name,
            item.unit,
            item.min_threshold,
            item.max_capacity,
            item.lead_time_days,
            item.cost_per_unit,
            item.supplier.as_deref().unwrap_or("")
        ));
    }
    for r in readings {
        hasher.update(format!("stock\t{}\t{}\t{}\n", r.date, r.item_name, r.current_stock));
    }
    for d in deliveries {
        hasher.update(format!(
            "delivery\t{}\t{}\t{}\n",
            d.date, d.item_name, d.delivery_amount
        ));
    }
    format!("{:x}", hasher.finalize())
}

// =========================================================================
// Snapshot host
// =========================================================================

/// Holds the current snapshot and swaps in new ones atomically
#[derive(Debug)]
pub struct SnapshotHost {
    current: RwLock<Arc<Snapshot>>,
    next_version: AtomicU64,
}

impl SnapshotHost {
    /// Start with an empty snapshot at version 0
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::build(0, SourceData::default()))),
            next_version: AtomicU64::new(1),
        }
    }

    /// The snapshot readers should use right now
    pub fn current(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Build a snapshot with the next version without publishing it
    pub fn prepare(&self, source: SourceData) -> Arc<Snapshot> {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        Arc::new(Snapshot::build(version, source))
    }

    /// Make `snapshot` current, returning the one it replaced
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> Arc<Snapshot> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, snapshot)
    }
}

impl Default for SnapshotHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rows::SkipReason;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_typed_negative_reading_is_rejected() {
        let source = SourceData::from_records(
            vec![Item::new("Milk", "L", 3.0, 30.0, 1)],
            vec![
                StockReading::new(day(1), "Milk", 10.0),
                StockReading::new(day(2), "Milk", -1.0),
            ],
            vec![],
        );
        let snapshot = Snapshot::build(1, source);

        assert_eq!(snapshot.readings().len(), 1);
        assert_eq!(snapshot.rejected().len(), 1);
        assert_eq!(snapshot.rejected()[0].reason, SkipReason::NegativeStock(-1.0));
        assert_eq!(snapshot.rejected()[0].date, Some(day(2)));
    }

    #[test]
    fn test_fingerprint_ignores_row_order() {
        let a = SourceData::from_records(
            vec![],
            vec![
                StockReading::new(day(1), "Milk", 10.0),
                StockReading::new(day(1), "Cups", 100.0),
            ],
            vec![],
        );
        let b = SourceData::from_records(
            vec![],
            vec![
                StockReading::new(day(1), "Cups", 100.0),
                StockReading::new(day(1), "Milk", 10.0),
            ],
            vec![],
        );
        assert_eq!(
            Snapshot::build(1, a).fingerprint(),
            Snapshot::build(2, b).fingerprint()
        );
    }

    #[test]
    fn test_later_duplicate_reading_wins() {
        let source = SourceData::from_records(
            vec![],
            vec![
                StockReading::new(day(1), "Milk", 10.0),
                StockReading::new(day(1), "Milk", 12.0),
            ],
            vec![],
        );
        let snapshot = Snapshot::build(1, source);
        assert_eq!(snapshot.readings().len(), 1);
        assert_eq!(snapshot.readings()[0].current_stock, 12.0);
        assert_eq!(snapshot.superseded_readings(), 1);
    }

    #[test]
    fn test_host_swaps_atomically() {
        let host = SnapshotHost::new();
        assert_eq!(host.current().version(), 0);

        let held = host.current();
        let next = host.prepare(SourceData::from_records(
            vec![Item::new("Milk", "L", 3.0, 30.0, 1)],
            vec![],
            vec![],
        ));
        let previous = host.publish(next);

        assert_eq!(previous.version(), 0);
        assert_eq!(host.current().version(), 1);
        assert!(held.catalog().is_empty(), "readers keep the snapshot they took");
    }
}
