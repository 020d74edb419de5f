//! Output formatting utilities

use std::io;

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Table
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// Print a list of records; `row` builds the table row for each record
pub fn print_records<T, R>(format: OutputFormat, records: &[T], row: impl Fn(&T) -> R) -> Result<()>
where
    T: Serialize,
    R: Tabled,
{
    match effective_format(format, true) {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for record in records {
                wtr.serialize(record).into_diagnostic()?;
            }
            wtr.flush().into_diagnostic()?;
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(records).into_diagnostic()?);
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let rows: Vec<R> = records.iter().map(row).collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            println!("{}", table);
        }
    }
    Ok(())
}

/// Print a single value when JSON or YAML was asked for explicitly
///
/// Returns false otherwise, leaving the caller to print its own summary.
pub fn print_value<T: Serialize>(format: OutputFormat, value: &T) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_lists_render_as_tables() {
        assert_eq!(effective_format(OutputFormat::Auto, true), OutputFormat::Table);
        assert_eq!(effective_format(OutputFormat::Csv, true), OutputFormat::Csv);
    }

    #[test]
    fn test_print_value_leaves_auto_to_caller() {
        assert!(!print_value(OutputFormat::Auto, &1).unwrap());
        assert!(!print_value(OutputFormat::Table, &1).unwrap());
    }
}
