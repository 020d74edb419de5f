//! Command-line arguments

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    audit::AuditArgs, completions::CompletionsArgs, consumption::ConsumptionArgs,
    forecast::ForecastArgs, ingest::IngestArgs, recommend::RecommendArgs,
};
use crate::core::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(
    name = "stockpile",
    version,
    about = "Derive consumption, forecast runout, and recommend purchases from stock counts",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline and write every derived dataset
    Run,

    /// Show consumption derived from consecutive stock counts
    Consumption(ConsumptionArgs),

    /// Show runout forecasts for every item
    Forecast(ForecastArgs),

    /// Show purchase recommendations, most urgent first
    Recommend(RecommendArgs),

    /// Check the source data and stored consumption for integrity problems
    Audit(AuditArgs),

    /// One-screen inventory overview
    Status,

    /// Merge an uploaded CSV into the master data, then rerun the pipeline
    Ingest(IngestArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Directory holding the CSV datasets
    #[arg(long, global = true, env = "STOCKPILE_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub output: OutputFormat,

    /// Treat this date as today (YYYY-MM-DD)
    #[arg(long, global = true, env = "STOCKPILE_AS_OF")]
    pub as_of: Option<NaiveDate>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Trailing window of consumption days used for forecasts
    #[arg(long, global = true, env = "STOCKPILE_WINDOW_DAYS")]
    pub window_days: Option<u32>,

    /// Days after which an item's newest count is reported as stale
    #[arg(long, global = true, env = "STOCKPILE_STALENESS_DAYS")]
    pub staleness_days: Option<u32>,

    /// Days between counts, with no delivery, that trigger a gap warning
    #[arg(long = "gap-days", global = true, env = "STOCKPILE_GAP_DAYS")]
    pub gap_warning_days: Option<u32>,

    /// Total spend cap for one set of recommendations
    #[arg(long = "budget", global = true, env = "STOCKPILE_BUDGET")]
    pub budget_ceiling: Option<f64>,

    /// Also list items that need no action
    #[arg(long, global = true)]
    pub include_healthy: bool,
}

impl GlobalOpts {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            window_days: self.window_days,
            staleness_days: self.staleness_days,
            gap_warning_days: self.gap_warning_days,
            budget_ceiling: self.budget_ceiling,
            include_healthy: self.include_healthy,
        }
    }

    /// The run date: `--as-of`, or today in local time
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table for lists, YAML for single objects
    Auto,
    Table,
    Csv,
    Json,
    Yaml,
}
