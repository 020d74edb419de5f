//! `stockpile audit` command - data integrity report

use console::style;
use miette::Result;

use crate::cli::helpers::{open_pipeline, styled_severity};
use crate::cli::output::{effective_format, print_records};
use crate::cli::table::FindingRow;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::text::fmt_date_or;
use crate::entities::{AuditFinding, Severity};

#[derive(clap::Args, Debug)]
pub struct AuditArgs {
    /// Strict mode - warnings also fail the audit
    #[arg(long)]
    pub strict: bool,

    /// Print a text report grouped by severity
    #[arg(long)]
    pub report: bool,
}

pub fn run(args: AuditArgs, global: &GlobalOpts) -> Result<()> {
    let findings = open_pipeline(global)?.audit_stored(global.as_of())?;

    let critical = count(&findings, Severity::Critical);
    let warnings = count(&findings, Severity::Warning);
    let info = count(&findings, Severity::Info);

    if args.report {
        print_report(&findings);
    } else {
        print_records(global.output, &findings, |f| FindingRow::from(f))?;
    }

    let is_table = effective_format(global.output, true) == OutputFormat::Table;
    if is_table {
        println!();
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", style("Audit Summary").bold());
        println!("{}", style("─".repeat(60)).dim());
        println!("  Critical: {}", style(critical).red());
        println!("  Warning:  {}", style(warnings).yellow());
        println!("  Info:     {}", style(info).blue());
        println!();
    }

    if critical > 0 {
        Err(miette::miette!(
            "Audit failed: {} critical finding(s)",
            critical
        ))
    } else if args.strict && warnings > 0 {
        Err(miette::miette!(
            "Audit failed in strict mode: {} warning(s)",
            warnings
        ))
    } else {
        if is_table {
            println!("{} No critical findings", style("✓").green().bold());
        }
        Ok(())
    }
}

fn count(findings: &[AuditFinding], severity: Severity) -> usize {
    findings.iter().filter(|f| f.severity == severity).count()
}

/// Findings grouped under one heading per severity
fn print_report(findings: &[AuditFinding]) {
    if findings.is_empty() {
        println!("{} No findings", style("✓").green());
        return;
    }

    for severity in [Severity::Critical, Severity::Warning, Severity::Info] {
        let group: Vec<&AuditFinding> = findings.iter().filter(|f| f.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        println!("{} ({})", styled_severity(severity), group.len());
        for finding in group {
            println!(
                "  [{}] {} {} {}",
                style(finding.rule_id).dim(),
                finding.item_name.as_deref().unwrap_or("-"),
                fmt_date_or(finding.date, "-"),
                finding.message
            );
        }
        println!();
    }
}
