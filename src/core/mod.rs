//! Core module - the analytics pipeline and its building blocks

pub mod audit;
pub mod catalog;
pub mod config;
pub mod consumption;
pub mod forecast;
pub mod join;
pub mod merge;
pub mod pipeline;
pub mod recommend;
pub mod rows;
pub mod snapshot;
pub mod status;
pub mod text;

pub use audit::audit;
pub use catalog::Catalog;
pub use config::{AnalyticsConfig, ConfigOverrides, UrgencyMultipliers};
pub use consumption::derive_consumption;
pub use forecast::forecast;
pub use join::{join_by_name, ItemHistory, JoinResult};
pub use merge::{append_deliveries, merge_readings, MergeOutcome};
pub use pipeline::{run_pipeline, DatasetStore, Pipeline, PipelineError, PipelineOutput};
pub use recommend::recommend;
pub use rows::{RowResult, RowSource, SkipReason, SkippedRow};
pub use snapshot::{Snapshot, SnapshotHost, SourceData};
pub use status::StatusSummary;
