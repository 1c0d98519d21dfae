//! Data types produced by the overlap detector.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Whether a pair needs at least one flagged interval to be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    RequireFlagged,
    Unfiltered,
}

/// Which side(s) of an overlap carried a selection reason code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BothFlagged,
    OnlyAFlagged,
    OnlyBFlagged,
    /// Only reachable when detection runs [`SelectionMode::Unfiltered`].
    NeitherFlagged,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::BothFlagged,
        Category::OnlyAFlagged,
        Category::OnlyBFlagged,
        Category::NeitherFlagged,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::BothFlagged => "Both flagged",
            Category::OnlyAFlagged => "Only A flagged",
            Category::OnlyBFlagged => "Only B flagged",
            Category::NeitherFlagged => "Neither flagged",
        }
    }
}

/// One strictly positive intersection between two agents' Not-Ready intervals.
///
/// Slot A always holds the interval from the earlier source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapRecord {
    pub agent_a: String,
    pub agent_b: String,
    pub row_a: usize,
    pub row_b: usize,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub duration_secs: i64,
    pub reason_a: String,
    pub reason_b: String,
    pub flagged_a: bool,
    pub flagged_b: bool,
    pub category: Category,
}

impl OverlapRecord {
    pub fn date(&self) -> NaiveDate {
        self.window_start.date()
    }

    pub fn hour(&self) -> u32 {
        self.window_start.hour()
    }

    pub fn weekday(&self) -> Weekday {
        self.window_start.weekday()
    }

    pub fn involves(&self, agent: &str) -> bool {
        self.agent_a == agent || self.agent_b == agent
    }

    /// Human-readable overlap type naming the flagged agent.
    pub fn category_label(&self) -> String {
        match self.category {
            Category::BothFlagged => "Both flagged".to_string(),
            Category::OnlyAFlagged => format!("{} flagged", self.agent_a),
            Category::OnlyBFlagged => format!("{} flagged", self.agent_b),
            Category::NeitherFlagged => "Neither flagged".to_string(),
        }
    }
}
