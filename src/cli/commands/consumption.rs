//! `stockpile consumption` command - derived usage per counted day

use miette::Result;

use crate::cli::helpers::open_pipeline;
use crate::cli::output::print_records;
use crate::cli::table::ConsumptionRow;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ConsumptionArgs {
    /// Only show this item
    #[arg(long)]
    pub item: Option<String>,

    /// Only show records flagged as anomalies
    #[arg(long)]
    pub anomalies: bool,
}

pub fn run(args: ConsumptionArgs, global: &GlobalOpts) -> Result<()> {
    let output = open_pipeline(global)?.preview(global.as_of())?;

    let records: Vec<_> = output
        .consumption
        .into_iter()
        .filter(|r| args.item.as_deref().is_none_or(|name| r.item_name == name))
        .filter(|r| !args.anomalies || r.anomaly)
        .collect();

    print_records(global.output, &records, |r| ConsumptionRow::from(r))
}
