//! Analytics configuration - named, overridable options for every pipeline stage
//!
//! Options are layered: built-in defaults, then the user config file, then
//! `stockpile.yaml` in the data directory, then command-line overrides.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::yaml::{read_layer, YamlError};

/// File name of the per-data-directory config
pub const DATA_DIR_CONFIG: &str = "stockpile.yaml";

/// Lead-time multipliers that bound each urgency level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyMultipliers {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
}

impl Default for UrgencyMultipliers {
    fn default() -> Self {
        Self {
            critical: 1.0,
            high: 2.0,
            medium: 3.0,
        }
    }
}

/// Configuration shared by the auditor, forecaster and recommender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Trailing window N for the rolling average
    pub window_days: u32,

    /// Info finding when an item's newest reading is older than this
    pub staleness_days: u32,

    /// Warning when consecutive readings are further apart than this with no delivery
    pub gap_warning_days: u32,

    pub urgency_multipliers: UrgencyMultipliers,

    /// Total spend cap for one recommendation run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_ceiling: Option<f64>,

    /// Coefficient of variation above which confidence drops one level
    pub variation_threshold: f64,

    /// Emit `Urgency::None` rows for items that need no action
    pub include_healthy: bool,

    /// Allowed difference in the consumption self-check
    pub consistency_tolerance: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            window_days: 14,
            staleness_days: 3,
            gap_warning_days: 7,
            urgency_multipliers: UrgencyMultipliers::default(),
            budget_ceiling: None,
            variation_threshold: 0.5,
            include_healthy: false,
            consistency_tolerance: 0.01,
        }
    }
}

/// Partial config as found in a YAML file; unset fields leave the lower layer alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigLayer {
    window_days: Option<u32>,
    staleness_days: Option<u32>,
    gap_warning_days: Option<u32>,
    urgency_multipliers: Option<MultiplierLayer>,
    budget_ceiling: Option<f64>,
    variation_threshold: Option<f64>,
    include_healthy: Option<bool>,
    consistency_tolerance: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MultiplierLayer {
    critical: Option<f64>,
    high: Option<f64>,
    medium: Option<f64>,
}

/// Command-line overrides, applied last
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub window_days: Option<u32>,
    pub staleness_days: Option<u32>,
    pub gap_warning_days: Option<u32>,
    pub budget_ceiling: Option<f64>,
    pub include_healthy: bool,
}

impl AnalyticsConfig {
    /// Load the layered configuration for a data directory
    pub fn load(data_dir: &Path, overrides: &ConfigOverrides) -> Result<Self, YamlError> {
        let mut config = Self::default();

        let layers = Self::user_config_path()
            .into_iter()
            .chain([data_dir.join(DATA_DIR_CONFIG)]);
        for path in layers {
            if let Some(layer) = read_layer::<ConfigLayer>(&path)? {
                tracing::debug!(path = %path.display(), "applying config layer");
                config.apply(layer);
            }
        }

        config.apply_overrides(overrides);
        Ok(config)
    }

    /// Location of the per-user config file, if a home directory is known
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "stockpile").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.window_days {
            self.window_days = v;
        }
        if let Some(v) = layer.staleness_days {
            self.staleness_days = v;
        }
        if let Some(v) = layer.gap_warning_days {
            self.gap_warning_days = v;
        }
        if let Some(m) = layer.urgency_multipliers {
            if let Some(v) = m.critical {
                self.urgency_multipliers.critical = v;
            }
            if let Some(v) = m.high {
                self.urgency_multipliers.high = v;
            }
            if let Some(v) = m.medium {
                self.urgency_multipliers.medium = v;
            }
        }
        if layer.budget_ceiling.is_some() {
            self.budget_ceiling = layer.budget_ceiling;
        }
        if let Some(v) = layer.variation_threshold {
            self.variation_threshold = v;
        }
        if let Some(v) = layer.include_healthy {
            self.include_healthy = v;
        }
        if let Some(v) = layer.consistency_tolerance {
            self.consistency_tolerance = v;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.window_days {
            self.window_days = v;
        }
        if let Some(v) = overrides.staleness_days {
            self.staleness_days = v;
        }
        if let Some(v) = overrides.gap_warning_days {
            self.gap_warning_days = v;
        }
        if overrides.budget_ceiling.is_some() {
            self.budget_ceiling = overrides.budget_ceiling;
        }
        if overrides.include_healthy {
            self.include_healthy = true;
        }
    }

    /// Window length, never below one day
    pub fn window(&self) -> u32 {
        self.window_days.max(1)
    }
}
