//! Pipeline orchestration - snapshot, derive, audit, forecast, recommend, commit
//!
//! [`run_pipeline`] is the pure part: it only reads a [`Snapshot`]. The
//! [`Pipeline`] host adds the run lock, loading through a [`DatasetStore`],
//! and publishing the new snapshot once its outputs are safely stored.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::core::audit::audit;
use crate::core::config::AnalyticsConfig;
use crate::core::consumption::derive_consumption;
use crate::core::forecast::forecast;
use crate::core::recommend::recommend;
use crate::core::snapshot::{Snapshot, SnapshotHost, SourceData};
use crate::core::status::StatusSummary;
use crate::dataset::StoreError;
use crate::entities::{AuditFinding, ConsumptionRecord, ForecastRecord, RecommendationRecord};
use crate::yaml::YamlError;

/// Pipeline-level failures, as opposed to per-row findings
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("Another pipeline run is in progress (lock file {})", path.display())]
    #[diagnostic(
        code(stockpile::pipeline::locked),
        help("wait for the other run to finish, or delete the lock file if no run is active")
    )]
    Locked { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(code(stockpile::pipeline::store))]
    Store(StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] YamlError),
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Locked { path } => PipelineError::Locked { path },
            other => PipelineError::Store(other),
        }
    }
}

/// Everything one run derives
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub as_of: NaiveDate,
    pub snapshot_version: u64,
    pub fingerprint: String,
    pub consumption: Vec<ConsumptionRecord>,
    pub forecasts: Vec<ForecastRecord>,
    pub recommendations: Vec<RecommendationRecord>,
    pub findings: Vec<AuditFinding>,
    pub summary: StatusSummary,
}

/// Run every stage over `snapshot`
pub fn run_pipeline(snapshot: &Snapshot, config: &AnalyticsConfig, as_of: NaiveDate) -> PipelineOutput {
    let consumption = derive_consumption(&snapshot.join());
    let findings = audit(snapshot, Some(consumption.as_slice()), config, as_of);
    let forecasts = forecast(snapshot, &consumption, config, as_of);
    let recommendations = recommend(&forecasts, snapshot.catalog(), config, as_of);
    let summary = StatusSummary::build(
        snapshot.catalog(),
        &forecasts,
        &recommendations,
        &findings,
        as_of,
    );

    tracing::info!(
        version = snapshot.version(),
        consumption = consumption.len(),
        forecasts = forecasts.len(),
        recommendations = recommendations.len(),
        findings = findings.len(),
        "pipeline run complete"
    );

    PipelineOutput {
        as_of,
        snapshot_version: snapshot.version(),
        fingerprint: snapshot.fingerprint().to_string(),
        consumption,
        forecasts,
        recommendations,
        findings,
        summary,
    }
}

/// Where the pipeline reads its inputs and stores its outputs
pub trait DatasetStore {
    /// Held for the duration of a run; released on drop
    type Guard;

    /// Take the cross-process run lock, failing with [`StoreError::Locked`]
    fn lock(&self) -> Result<Self::Guard, StoreError>;

    fn load_source(&self) -> Result<SourceData, StoreError>;

    /// Previously stored consumption, `None` when nothing has been stored yet
    fn load_consumption(&self) -> Result<Option<Vec<ConsumptionRecord>>, StoreError>;

    /// Replace every derived dataset, or leave all of them untouched on error
    fn commit(&self, output: &PipelineOutput) -> Result<(), StoreError>;
}

/// Host that serializes runs and owns the current snapshot
pub struct Pipeline<S: DatasetStore> {
    store: S,
    config: AnalyticsConfig,
    host: SnapshotHost,
    run_lock: Mutex<()>,
}

impl<S: DatasetStore> Pipeline<S> {
    pub fn new(store: S, config: AnalyticsConfig) -> Self {
        Self {
            store,
            config,
            host: SnapshotHost::new(),
            run_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// The most recently committed snapshot
    pub fn current(&self) -> Arc<Snapshot> {
        self.host.current()
    }

    /// Full recomputation and commit
    pub fn run(&self, as_of: NaiveDate) -> Result<PipelineOutput, PipelineError> {
        self.update_and_run(as_of, |_| Ok(())).map(|(_, output)| output)
    }

    /// Apply `update` to the stored inputs, then run, all under the run lock
    pub fn update_and_run<T>(
        &self,
        as_of: NaiveDate,
        update: impl FnOnce(&S) -> Result<T, StoreError>,
    ) -> Result<(T, PipelineOutput), PipelineError> {
        let _run = self.run_lock.lock().unwrap_or_else(|e| e.into_inner());
        let _guard = self.store.lock().inspect_err(|err| {
            if let StoreError::Locked { path } = err {
                tracing::warn!(path = %path.display(), "pipeline run lock is held");
            }
        })?;

        let updated = update(&self.store)?;

        let snapshot = self.host.prepare(self.store.load_source()?);
        let output = run_pipeline(&snapshot, &self.config, as_of);
        self.store.commit(&output)?;
        self.host.publish(snapshot);

        Ok((updated, output))
    }

    /// Derive outputs from the stored inputs without writing anything
    pub fn preview(&self, as_of: NaiveDate) -> Result<PipelineOutput, PipelineError> {
        let snapshot = self.host.prepare(self.store.load_source()?);
        Ok(run_pipeline(&snapshot, &self.config, as_of))
    }

    /// Audit the inputs together with the stored consumption dataset
    pub fn audit_stored(&self, as_of: NaiveDate) -> Result<Vec<AuditFinding>, PipelineError> {
        let snapshot = self.host.prepare(self.store.load_source()?);
        let stored = self.store.load_consumption()?;
        Ok(audit(&snapshot, stored.as_deref(), &self.config, as_of))
    }
}
