//! Keyed join of catalog, stock readings and deliveries by item name
//!
//! Referential gaps are explicit: every name lands in exactly one of
//! `matched`, `records_only` or `catalog_only`.

use std::collections::BTreeMap;

use crate::core::catalog::Catalog;
use crate::entities::{DeliveryRecord, Item, StockReading};

/// Everything recorded for one item name
#[derive(Debug, Clone)]
pub struct ItemHistory<'a> {
    pub name: &'a str,
    /// Catalog entry, absent for orphaned records
    pub item: Option<&'a Item>,
    /// Readings in date order
    pub readings: Vec<&'a StockReading>,
    /// Deliveries in date order
    pub deliveries: Vec<&'a DeliveryRecord>,
}

impl<'a> ItemHistory<'a> {
    fn new(name: &'a str, item: Option<&'a Item>) -> Self {
        Self {
            name,
            item,
            readings: Vec::new(),
            deliveries: Vec::new(),
        }
    }

    /// The most recent reading, if any
    pub fn latest_reading(&self) -> Option<&'a StockReading> {
        self.readings.last().copied()
    }
}

/// Result of joining records against the catalog
#[derive(Debug, Clone, Default)]
pub struct JoinResult<'a> {
    /// Catalog items with at least one reading or delivery
    pub matched: Vec<ItemHistory<'a>>,
    /// Names present in readings or deliveries but not in the catalog
    pub records_only: Vec<ItemHistory<'a>>,
    /// Catalog items with no records at all
    pub catalog_only: Vec<&'a Item>,
}

impl<'a> JoinResult<'a> {
    /// All histories with records, catalogued or not, in name order
    pub fn histories(&self) -> Vec<&ItemHistory<'a>> {
        let mut all: Vec<&ItemHistory<'a>> =
            self.matched.iter().chain(self.records_only.iter()).collect();
        all.sort_by(|a, b| a.name.cmp(b.name));
        all
    }

    /// History for a name, if it has any records
    pub fn history(&self, name: &str) -> Option<&ItemHistory<'a>> {
        self.matched
            .iter()
            .chain(self.records_only.iter())
            .find(|h| h.name == name)
    }
}

/// Join readings and deliveries to the catalog by exact item name
pub fn join_by_name<'a>(
    catalog: &'a Catalog,
    readings: &'a [StockReading],
    deliveries: &'a [DeliveryRecord],
) -> JoinResult<'a> {
    let mut by_name: BTreeMap<&'a str, ItemHistory<'a>> = BTreeMap::new();

    for reading in readings {
        by_name
            .entry(reading.item_name.as_str())
            .or_insert_with(|| {
                ItemHistory::new(reading.item_name.as_str(), catalog.get(&reading.item_name))
            })
            .readings
            .push(reading);
    }

    for delivery in deliveries {
        by_name
            .entry(delivery.item_name.as_str())
            .or_insert_with(|| {
                ItemHistory::new(delivery.item_name.as_str(), catalog.get(&delivery.item_name))
            })
            .deliveries
            .push(delivery);
    }

    let mut result = JoinResult::default();
    for (_, mut history) in by_name {
        history.readings.sort_by_key(|r| r.date);
        history.deliveries.sort_by_key(|d| d.date);
        if history.item.is_some() {
            result.matched.push(history);
        } else {
            result.records_only.push(history);
        }
    }

    result.catalog_only = catalog
        .iter()
        .filter(|item| result.matched.iter().all(|h| h.name != item.name))
        .collect();

    result
}
