//! Data directory layout and the CSV-backed dataset store

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;

use crate::core::merge::{append_deliveries, merge_readings};
use crate::core::pipeline::{DatasetStore, PipelineOutput};
use crate::core::rows::{
    parse_delivery_row, parse_stock_row, RawDeliveryRow, RawStockRow, RowResult, RowSource,
    SkipReason, SkippedRow,
};
use crate::core::snapshot::SourceData;
use crate::dataset::lock::RunLock;
use crate::dataset::read;
use crate::dataset::write::{replace_files, to_csv, to_json, Manifest, PendingFile};
use crate::dataset::StoreError;
use crate::entities::ConsumptionRecord;

pub const ITEMS_FILE: &str = "item_info.csv";
pub const STOCK_FILE: &str = "daily_stock_levels.csv";
pub const DELIVERIES_FILE: &str = "deliveries.csv";
pub const CONSUMPTION_FILE: &str = "daily_consumption.csv";
pub const FORECAST_FILE: &str = "forecast_results.csv";
pub const RECOMMENDATIONS_FILE: &str = "recommendations.csv";
pub const AUDIT_FILE: &str = "audit_results.csv";
pub const MANIFEST_FILE: &str = "pipeline_manifest.json";

/// A directory of CSV datasets
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

/// What an upload changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub added: usize,
    /// Existing readings replaced by the upload
    pub conflicts_resolved: usize,
    /// Upload rows that could not be used
    pub rejected: Vec<SkippedRow>,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Merge uploaded stock counts into the master file, newest upload winning
    ///
    /// Upload rows that fail conversion are appended verbatim so the next
    /// audit reports them. A rejected master row is dropped once a valid
    /// upload reading for the same date and item replaces it.
    pub fn ingest_stock(&self, upload: &Path) -> Result<IngestReport, StoreError> {
        let upload = split_rows(upload, RowSource::Stock, parse_stock_row)?;
        let master = split_rows(&self.path(STOCK_FILE), RowSource::Stock, parse_stock_row)?;

        let replaced: BTreeSet<(NaiveDate, String)> = upload
            .records
            .iter()
            .map(|r| (r.date, r.item_name.clone()))
            .collect();
        let superseded = |skip: &SkippedRow| match (skip.date, &skip.item_name) {
            (Some(date), Some(name)) => replaced.contains(&(date, name.clone())),
            _ => false,
        };

        let (upload_raw, mut rejected): (Vec<RawStockRow>, Vec<SkippedRow>) =
            upload.kept.into_iter().unzip();
        rejected.extend(upload.unreadable);

        let outcome = merge_readings(master.records, upload.records);
        let rows: Vec<RawStockRow> = outcome
            .readings
            .iter()
            .map(RawStockRow::from)
            .chain(
                master
                    .kept
                    .into_iter()
                    .filter(|(_, skip)| !superseded(skip))
                    .map(|(raw, _)| raw),
            )
            .chain(upload_raw)
            .collect();
        replace_files(&self.root, vec![to_csv(STOCK_FILE, &rows)?])?;

        tracing::info!(
            added = outcome.added,
            conflicts_resolved = outcome.conflicts_resolved,
            rejected = rejected.len(),
            "stock upload merged"
        );
        Ok(IngestReport {
            added: outcome.added,
            conflicts_resolved: outcome.conflicts_resolved,
            rejected,
        })
    }

    /// Append uploaded deliveries to the master file
    ///
    /// Rows that fail conversion are kept verbatim, as for stock uploads.
    pub fn ingest_deliveries(&self, upload: &Path) -> Result<IngestReport, StoreError> {
        let upload = split_rows(upload, RowSource::Delivery, parse_delivery_row)?;
        let master = split_rows(
            &self.path(DELIVERIES_FILE),
            RowSource::Delivery,
            parse_delivery_row,
        )?;

        let (upload_raw, mut rejected): (Vec<RawDeliveryRow>, Vec<SkippedRow>) =
            upload.kept.into_iter().unzip();
        rejected.extend(upload.unreadable);

        let added = upload.records.len();
        let merged = append_deliveries(master.records, upload.records);
        let rows: Vec<RawDeliveryRow> = merged
            .iter()
            .map(RawDeliveryRow::from)
            .chain(master.kept.into_iter().map(|(raw, _)| raw))
            .chain(upload_raw)
            .collect();
        replace_files(&self.root, vec![to_csv(DELIVERIES_FILE, &rows)?])?;

        tracing::info!(added, rejected = rejected.len(), "delivery upload merged");
        Ok(IngestReport {
            added,
            conflicts_resolved: 0,
            rejected,
        })
    }
}

/// Rows of one file: parsed records, rows that failed conversion kept as
/// they were, and rows the reader could not decode at all
struct SplitRows<T, R> {
    records: Vec<T>,
    kept: Vec<(R, SkippedRow)>,
    unreadable: Vec<SkippedRow>,
}

fn split_rows<R: DeserializeOwned, T>(
    path: &Path,
    source: RowSource,
    parse: impl Fn(&R, usize) -> RowResult<T>,
) -> Result<SplitRows<T, R>, StoreError> {
    let mut split = SplitRows {
        records: Vec::new(),
        kept: Vec::new(),
        unreadable: Vec::new(),
    };
    for (line, raw) in read::read_raw::<R>(path)? {
        match raw {
            Ok(raw) => match parse(&raw, line) {
                Ok(record) => split.records.push(record),
                Err(skip) => split.kept.push((raw, skip)),
            },
            Err(message) => {
                // Cannot be written back
                tracing::warn!(path = %path.display(), line, %message, "dropping unreadable row");
                split.unreadable.push(SkippedRow {
                    source,
                    line: Some(line),
                    item_name: None,
                    date: None,
                    reason: SkipReason::Unreadable(message),
                });
            }
        }
    }
    Ok(split)
}

impl DatasetStore for DataDir {
    type Guard = RunLock;

    fn lock(&self) -> Result<RunLock, StoreError> {
        RunLock::acquire(&self.root)
    }

    fn load_source(&self) -> Result<SourceData, StoreError> {
        Ok(SourceData {
            items: read::load_items(&self.path(ITEMS_FILE))?,
            stock: read::load_stock(&self.path(STOCK_FILE))?,
            deliveries: read::load_deliveries(&self.path(DELIVERIES_FILE))?,
        })
    }

    fn load_consumption(&self) -> Result<Option<Vec<ConsumptionRecord>>, StoreError> {
        read::load_consumption(&self.path(CONSUMPTION_FILE))
    }

    fn commit(&self, output: &PipelineOutput) -> Result<(), StoreError> {
        let files: Vec<PendingFile> = vec![
            to_csv(CONSUMPTION_FILE, &output.consumption)?,
            to_csv(FORECAST_FILE, &output.forecasts)?,
            to_csv(RECOMMENDATIONS_FILE, &output.recommendations)?,
            to_csv(AUDIT_FILE, &output.findings)?,
            to_json(MANIFEST_FILE, &Manifest::from_output(output))?,
        ];
        let written = replace_files(&self.root, files)?;
        tracing::info!(files = written.len(), dir = %self.root.display(), "outputs committed");
        Ok(())
    }
}
