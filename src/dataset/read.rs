//! CSV readers for the input datasets
//!
//! Every field is read as text and converted row by row; a row that fails
//! becomes a skip reason instead of aborting the load. A missing file reads as
//! an empty dataset.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::core::rows::{
    parse_delivery_row, parse_item_row, parse_stock_row, RawDeliveryRow, RawItemRow, RawStockRow,
    RowResult, RowSource, SkipReason, SkippedRow,
};
use crate::dataset::StoreError;
use crate::entities::{ConsumptionRecord, DeliveryRecord, Item, StockReading};

/// One data row: its line in the file and the raw fields, or why it was unreadable
pub type RawRow<R> = (usize, Result<R, String>);

/// Read every data row of `path` into raw string records
pub fn read_raw<R: DeserializeOwned>(path: &Path) -> Result<Vec<RawRow<R>>, StoreError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "input file missing, treating as empty");
        return Ok(Vec::new());
    }

    let read_err = |source: csv::Error| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;
    let headers = reader.headers().map_err(read_err)?.clone();

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(read_err)?;
        // Header is line 1
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);
        if record.iter().all(str::is_empty) {
            continue;
        }
        let parsed = record
            .deserialize::<R>(Some(&headers))
            .map_err(|e| e.to_string());
        rows.push((line, parsed));
    }
    Ok(rows)
}

fn convert<R, T>(
    rows: Vec<RawRow<R>>,
    source: RowSource,
    parse: impl Fn(&R, usize) -> RowResult<T>,
) -> Vec<RowResult<T>> {
    rows.into_iter()
        .map(|(line, raw)| match raw {
            Ok(raw) => parse(&raw, line),
            Err(message) => Err(SkippedRow {
                source,
                line: Some(line),
                item_name: None,
                date: None,
                reason: SkipReason::Unreadable(message),
            }),
        })
        .collect()
}

pub fn load_items(path: &Path) -> Result<Vec<RowResult<Item>>, StoreError> {
    Ok(convert(
        read_raw::<RawItemRow>(path)?,
        RowSource::Catalog,
        parse_item_row,
    ))
}

pub fn load_stock(path: &Path) -> Result<Vec<RowResult<StockReading>>, StoreError> {
    Ok(convert(
        read_raw::<RawStockRow>(path)?,
        RowSource::Stock,
        parse_stock_row,
    ))
}

pub fn load_deliveries(path: &Path) -> Result<Vec<RowResult<DeliveryRecord>>, StoreError> {
    Ok(convert(
        read_raw::<RawDeliveryRow>(path)?,
        RowSource::Delivery,
        parse_delivery_row,
    ))
}

/// Read a consumption dataset written by a previous run
///
/// Returns `None` when the file does not exist. Unlike the inputs, this file
/// is machine-written, so any unreadable row fails the whole load.
pub fn load_consumption(path: &Path) -> Result<Option<Vec<ConsumptionRecord>>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let records = reader
        .deserialize::<ConsumptionRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(records))
}
