//! Shared helper functions for CLI commands

use console::style;
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::config::AnalyticsConfig;
use crate::core::pipeline::Pipeline;
use crate::dataset::DataDir;
use crate::entities::{Severity, Urgency};

/// Load the layered config and open the data directory
pub fn open_pipeline(global: &GlobalOpts) -> Result<Pipeline<DataDir>> {
    let config = AnalyticsConfig::load(&global.data_dir, &global.overrides())?;
    tracing::debug!(?config, data_dir = %global.data_dir.display(), "configuration loaded");
    Ok(Pipeline::new(DataDir::new(&global.data_dir), config))
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn styled_urgency(urgency: Urgency) -> String {
    let label = urgency.to_string();
    match urgency {
        Urgency::Critical => style(label).red().bold().to_string(),
        Urgency::High => style(label).red().to_string(),
        Urgency::Medium => style(label).yellow().to_string(),
        Urgency::Low => style(label).cyan().to_string(),
        Urgency::None => style(label).dim().to_string(),
    }
}

pub fn styled_severity(severity: Severity) -> String {
    let label = severity.to_string();
    match severity {
        Severity::Critical => style(label).red().bold().to_string(),
        Severity::Warning => style(label).yellow().to_string(),
        Severity::Info => style(label).blue().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("crème brûlée", 8), "crème...");
    }
}
