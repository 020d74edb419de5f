//! Item catalog keyed by name

use std::collections::BTreeMap;

use crate::core::rows::{RowResult, RowSource, SkipReason, SkippedRow};
use crate::entities::Item;

/// Immutable item catalog with unique, case-sensitive names
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    items: BTreeMap<String, Item>,
}

impl Catalog {
    /// Build a catalog from per-row results
    ///
    /// Invalid entries and repeated names are returned as skipped rows; the
    /// first entry for a name wins.
    pub fn build(rows: Vec<RowResult<Item>>) -> (Self, Vec<SkippedRow>) {
        let mut items = BTreeMap::new();
        let mut skipped = Vec::new();

        for row in rows {
            let item = match row {
                Ok(item) => item,
                Err(skip) => {
                    skipped.push(skip);
                    continue;
                }
            };

            if let Err(reason) = item.check() {
                skipped.push(SkippedRow {
                    source: RowSource::Catalog,
                    line: None,
                    item_name: Some(item.name.clone()),
                    date: None,
                    reason: SkipReason::InvalidItem(reason),
                });
                continue;
            }

            if items.contains_key(&item.name) {
                skipped.push(SkippedRow {
                    source: RowSource::Catalog,
                    line: None,
                    item_name: Some(item.name.clone()),
                    date: None,
                    reason: SkipReason::DuplicateItem,
                });
                continue;
            }

            items.insert(item.name.clone(), item);
        }

        (Self { items }, skipped)
    }

    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        Self::build(items.into_iter().map(Ok).collect()).0
    }

    pub fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Items in name order
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_keeps_first() {
        let rows = vec![
            Ok(Item::new("Milk", "L", 3.0, 30.0, 1)),
            Ok(Item::new("Milk", "L", 5.0, 50.0, 2)),
            Ok(Item::new("milk", "L", 1.0, 10.0, 1)),
        ];
        let (catalog, skipped) = Catalog::build(rows);

        assert_eq!(catalog.len(), 2, "names are case-sensitive");
        assert_eq!(catalog.get("Milk").unwrap().max_capacity, 30.0);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].reason, SkipReason::DuplicateItem);
    }

    #[test]
    fn test_invalid_typed_item_is_skipped() {
        let rows = vec![Ok(Item::new("Cups", "pcs", 10.0, 0.0, 2))];
        let (catalog, skipped) = Catalog::build(rows);
        assert!(catalog.is_empty());
        assert!(matches!(skipped[0].reason, SkipReason::InvalidItem(_)));
    }
}
