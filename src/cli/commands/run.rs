//! `stockpile run` command - full pipeline with persisted outputs

use console::style;
use miette::Result;

use crate::cli::helpers::open_pipeline;
use crate::cli::output::print_value;
use crate::cli::GlobalOpts;
use crate::core::pipeline::PipelineOutput;
use crate::dataset::Manifest;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let pipeline = open_pipeline(global)?;
    let output = pipeline.run(global.as_of())?;

    if print_value(global.output, &Manifest::from_output(&output))? {
        return Ok(());
    }
    print_run_summary(&output, &global.data_dir.display().to_string());
    Ok(())
}

pub(crate) fn print_run_summary(output: &PipelineOutput, data_dir: &str) {
    println!(
        "{} Pipeline run for {} complete",
        style("✓").green(),
        style(output.as_of).cyan()
    );
    println!(
        "  Consumption records: {}",
        style(output.consumption.len()).cyan()
    );
    println!("  Forecasts:           {}", style(output.forecasts.len()).cyan());
    println!(
        "  Recommendations:     {}",
        style(output.recommendations.len()).cyan()
    );
    println!(
        "  Audit findings:      {} ({} critical)",
        style(output.findings.len()).cyan(),
        style(output.summary.findings.critical).red()
    );
    println!("  Written to {}", style(data_dir).dim());
}
