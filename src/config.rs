//! Run configuration: which reason codes are "selection" codes, whether
//! detection requires a flagged side, and how durations are parsed.
//!
//! Stored as a JSON object on disk, every key optional:
//! ```json
//! {
//!   "selection_codes": ["Lunch", "Meal"],
//!   "require_flagged": true,
//!   "duration_policy": "zero_default"
//! }
//! ```

use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::overlap::SelectionMode;

/// What to do with a Not-Ready row whose `AGENT STATE TIME` is missing or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// Treat the duration as zero seconds. The interval is kept but can never overlap.
    #[default]
    ZeroDefault,
    /// Skip the row and report it as malformed.
    Reject,
}

/// Unvalidated configuration, as read from a file and layered with env/CLI overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub selection_codes: Vec<String>,
    pub require_flagged: bool,
    pub duration_policy: DurationPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            selection_codes: vec!["Lunch".to_string()],
            require_flagged: true,
            duration_policy: DurationPolicy::ZeroDefault,
        }
    }
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Replaces the selection codes. An empty list leaves the current codes untouched.
    pub fn with_codes(mut self, codes: Vec<String>) -> Self {
        if !codes.is_empty() {
            self.selection_codes = codes;
        }
        self
    }

    /// Checks the configuration and freezes it into a [`SelectionConfig`].
    pub fn validate(&self) -> Result<SelectionConfig, ConfigError> {
        let mut codes = HashSet::with_capacity(self.selection_codes.len());
        for (index, code) in self.selection_codes.iter().enumerate() {
            let code = code.trim();
            if code.is_empty() {
                return Err(ConfigError::BlankSelectionCode { index });
            }
            codes.insert(code.to_string());
        }

        if codes.is_empty() && self.require_flagged {
            return Err(ConfigError::NoSelectionCodes);
        }

        let mode = if self.require_flagged {
            SelectionMode::RequireFlagged
        } else {
            SelectionMode::Unfiltered
        };

        Ok(SelectionConfig {
            codes,
            mode,
            duration_policy: self.duration_policy,
        })
    }
}

/// Splits a free-text code list (one per line or comma separated), dropping blanks.
pub fn parse_code_list(text: &str) -> Vec<String> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validated, immutable configuration passed into the interval builder and detector.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    codes: HashSet<String>,
    mode: SelectionMode,
    duration_policy: DurationPolicy,
}

impl SelectionConfig {
    /// Whether an interval with this reason code is flagged.
    ///
    /// With no selection codes configured every interval is flagged.
    pub fn is_flagged(&self, reason_code: &str) -> bool {
        self.codes.is_empty() || self.codes.contains(reason_code.trim())
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn duration_policy(&self) -> DurationPolicy {
        self.duration_policy
    }

    /// Configured codes in sorted order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.codes.iter().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
