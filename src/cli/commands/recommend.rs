//! `stockpile recommend` command - urgency-ranked purchase suggestions

use console::style;
use miette::Result;

use crate::cli::helpers::{open_pipeline, styled_urgency};
use crate::cli::output::{effective_format, print_records};
use crate::cli::table::RecommendationRow;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::text::fmt_qty;
use crate::entities::Urgency;

#[derive(clap::Args, Debug)]
pub struct RecommendArgs {
    /// Only show these urgencies (e.g. critical,high)
    #[arg(long, value_delimiter = ',')]
    pub urgency: Option<Vec<Urgency>>,

    /// Print the reasoning behind each recommendation
    #[arg(long)]
    pub explain: bool,
}

pub fn run(args: RecommendArgs, global: &GlobalOpts) -> Result<()> {
    let output = open_pipeline(global)?.preview(global.as_of())?;

    let recommendations: Vec<_> = output
        .recommendations
        .into_iter()
        .filter(|r| {
            args.urgency
                .as_ref()
                .is_none_or(|wanted| wanted.contains(&r.urgency))
        })
        .collect();

    let is_table = effective_format(global.output, true) == OutputFormat::Table;
    if is_table && recommendations.is_empty() {
        println!("{} No purchases needed.", style("✓").green());
        return Ok(());
    }

    if is_table && args.explain {
        for rec in &recommendations {
            println!(
                "{} {} - order {} {}",
                styled_urgency(rec.urgency),
                style(&rec.item_name).bold(),
                fmt_qty(rec.suggested_quantity),
                rec.unit
            );
            println!("  {}", rec.reasoning_text);
            println!();
        }
        return Ok(());
    }

    print_records(global.output, &recommendations, |r| {
        RecommendationRow::from(r)
    })?;

    if is_table {
        let total: f64 = recommendations.iter().map(|r| r.estimated_cost).sum();
        println!();
        println!("Estimated total: {}", style(format!("{:.2}", total)).cyan());
    }
    Ok(())
}
