//! Record filter applied between detection and aggregation.

use chrono::NaiveDate;

use crate::error::ConfigError;
use crate::overlap::types::{Category, OverlapRecord};

/// Narrows an overlap set before aggregation. An empty filter keeps everything.
#[derive(Debug, Clone, Default)]
pub struct OverlapFilter {
    /// Keep records involving any of these agents, in either slot.
    pub agents: Vec<String>,
    pub categories: Vec<Category>,
    pub min_duration_secs: i64,
    /// Inclusive bounds on the window start date.
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl OverlapFilter {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to)
            && from > to
        {
            return Err(ConfigError::InvertedDateRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
            && self.categories.is_empty()
            && self.min_duration_secs <= 0
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    pub fn matches(&self, record: &OverlapRecord) -> bool {
        if !self.agents.is_empty() && !self.agents.iter().any(|a| record.involves(a)) {
            return false;
        }

        if !self.categories.is_empty() && !self.categories.contains(&record.category) {
            return false;
        }

        if record.duration_secs < self.min_duration_secs {
            return false;
        }

        let date = record.date();
        if self.date_from.is_some_and(|from| date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| date > to) {
            return false;
        }

        true
    }

    pub fn apply(&self, records: &[OverlapRecord]) -> Vec<OverlapRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
