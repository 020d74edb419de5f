//! `stockpile ingest` command - merge an upload and rerun the pipeline

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use console::style;
use miette::Result;
use walkdir::WalkDir;

use crate::cli::commands::run::print_run_summary;
use crate::cli::helpers::open_pipeline;
use crate::cli::output::print_value;
use crate::cli::GlobalOpts;
use crate::dataset::{IngestReport, Manifest};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum IngestKind {
    /// Daily stock counts; a newer count replaces one for the same date and item
    Stock,
    /// Deliveries; always appended
    Deliveries,
}

#[derive(clap::Args, Debug)]
pub struct IngestArgs {
    /// What the file contains
    #[arg(long, value_enum)]
    pub kind: IngestKind,

    /// CSV file to merge, or a directory of CSV files merged in name order
    pub file: PathBuf,
}

pub fn run(args: IngestArgs, global: &GlobalOpts) -> Result<()> {
    let uploads = expand_paths(&args.file);
    if uploads.is_empty() {
        return Err(miette::miette!(
            "No CSV upload found at {}",
            args.file.display()
        ));
    }

    let pipeline = open_pipeline(global)?;
    let (report, output) = pipeline.update_and_run(global.as_of(), |store| {
        let mut total = IngestReport::default();
        for upload in &uploads {
            let report = match args.kind {
                IngestKind::Stock => store.ingest_stock(upload)?,
                IngestKind::Deliveries => store.ingest_deliveries(upload)?,
            };
            total.added += report.added;
            total.conflicts_resolved += report.conflicts_resolved;
            total.rejected.extend(report.rejected);
        }
        Ok(total)
    })?;

    for skipped in &report.rejected {
        eprintln!(
            "{} {}",
            style("!").yellow(),
            skipped.to_finding().message
        );
    }

    if print_value(global.output, &Manifest::from_output(&output))? {
        return Ok(());
    }

    println!(
        "{} Merged {} file(s): {} added, {} replaced, {} rejected",
        style("✓").green(),
        uploads.len(),
        style(report.added).cyan(),
        style(report.conflicts_resolved).yellow(),
        style(report.rejected.len()).red()
    );
    print_run_summary(&output, &global.data_dir.display().to_string());
    Ok(())
}

/// A file as given, or every `.csv` file under a directory in name order
fn expand_paths(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    if !path.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("csv")))
        .collect();
    files.sort();
    files
}
