//! `stockpile status` command - inventory overview

use console::style;
use miette::Result;

use crate::cli::helpers::open_pipeline;
use crate::cli::output::print_value;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let output = open_pipeline(global)?.preview(global.as_of())?;
    let summary = &output.summary;

    if print_value(global.output, summary)? {
        return Ok(());
    }

    println!("{}", style(format!("Inventory status as of {}", summary.as_of)).bold());
    println!("{}", style("─".repeat(60)).dim());
    println!("  Items tracked:        {}", style(summary.total_items).cyan());
    println!(
        "  At or below minimum:  {}",
        style(summary.low_stock_items.len()).yellow()
    );
    for name in &summary.low_stock_items {
        println!("    - {}", name);
    }
    if !summary.unmeasured_items.is_empty() {
        println!(
            "  Never counted:        {}",
            style(summary.unmeasured_items.len()).dim()
        );
    }
    println!(
        "  Orders needed:        {} critical, {} high, {} medium, {} low",
        style(summary.recommendations.critical).red().bold(),
        style(summary.recommendations.high).red(),
        style(summary.recommendations.medium).yellow(),
        style(summary.recommendations.low).cyan()
    );
    println!(
        "  Audit findings:       {} critical, {} warning, {} info",
        style(summary.findings.critical).red(),
        style(summary.findings.warning).yellow(),
        style(summary.findings.info).blue()
    );

    if summary.actionable() > 0 {
        println!();
        println!(
            "Use {} to see what to order.",
            style("stockpile recommend").cyan()
        );
    }
    Ok(())
}
