//! CLI command implementations

pub mod audit;
pub mod completions;
pub mod consumption;
pub mod forecast;
pub mod ingest;
pub mod recommend;
pub mod run;
pub mod status;
