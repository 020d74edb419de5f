//! `stockpile forecast` command - runout projections

use miette::Result;

use crate::cli::helpers::open_pipeline;
use crate::cli::output::print_records;
use crate::cli::table::ForecastRow;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ForecastArgs {
    /// Only show this item
    #[arg(long)]
    pub item: Option<String>,
}

pub fn run(args: ForecastArgs, global: &GlobalOpts) -> Result<()> {
    let output = open_pipeline(global)?.preview(global.as_of())?;

    let forecasts: Vec<_> = output
        .forecasts
        .into_iter()
        .filter(|f| args.item.as_deref().is_none_or(|name| f.item_name == name))
        .collect();

    print_records(global.output, &forecasts, |f| ForecastRow::from(f))
}
