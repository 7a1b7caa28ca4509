use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scaling::ScalingMethod;

/// Main configuration, loaded from `~/.config/markscale/config.yaml`.
/// Every field is optional; a missing config file means all defaults.
///
/// Example YAML:
/// ```yaml
/// roster: /home/admin/classes/2026/roster.json
/// default_method: bell-curve
/// colors: true
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Roster file path (default: ~/.config/markscale/roster.json)
    #[serde(default)]
    pub roster: Option<PathBuf>,

    /// Scaling method used by `scale` when no --method is given.
    /// One of: bell-curve, linear, min-max, percentile
    #[serde(default)]
    pub default_method: Option<String>,

    /// Force colored output on or off (default: auto-detect TTY)
    #[serde(default)]
    pub colors: Option<bool>,
}

impl Config {
    /// The configured default method, parsed. None when unset.
    /// `validate_config` has already rejected unparseable values at
    /// startup, so this quietly drops them.
    pub fn default_method(&self) -> Option<ScalingMethod> {
        self.default_method
            .as_deref()
            .and_then(|s| ScalingMethod::parse(s).ok())
    }
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref method) = config.default_method {
        if let Err(e) = ScalingMethod::parse(method) {
            errors.push(format!("default_method: {}", e));
        }
    }

    if let Some(ref roster) = config.roster {
        if roster.as_os_str().is_empty() {
            errors.push("roster: path must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
