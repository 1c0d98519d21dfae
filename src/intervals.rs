//! Interval builder: turns Not-Ready event rows into typed time intervals.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SelectionConfig;
use crate::error::RowError;
use crate::events::{EventRow, StateEvent};

/// A Not-Ready period of one agent. `end >= start` always holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    /// Zero-based index of the source row.
    pub row: usize,
    pub agent_id: String,
    pub reason_code: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub flagged: bool,
}

impl Interval {
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// A Not-Ready row that was excluded from the interval set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub agent_id: String,
    pub error: String,
}

/// Output of [`IntervalBuilder::build`].
#[derive(Debug, Default)]
pub struct IntervalSet {
    pub intervals: Vec<Interval>,
    pub skipped: Vec<SkippedRow>,
}

pub struct IntervalBuilder<'a> {
    selection: &'a SelectionConfig,
}

impl<'a> IntervalBuilder<'a> {
    pub fn new(selection: &'a SelectionConfig) -> Self {
        Self { selection }
    }

    /// Builds one interval per well-formed Not-Ready row.
    ///
    /// Rows in any other state are ignored. Malformed Not-Ready rows are skipped
    /// and listed in [`IntervalSet::skipped`]; they never fail the batch.
    pub fn build(&self, rows: &[EventRow]) -> IntervalSet {
        let mut set = IntervalSet::default();

        for (index, row) in rows.iter().enumerate() {
            if !row.is_not_ready() {
                continue;
            }

            match self.build_one(index, row) {
                Ok(interval) => set.intervals.push(interval),
                Err(e) => {
                    warn!(row = index, agent = %row.agent.trim(), error = %e, "Skipping malformed row");
                    set.skipped.push(SkippedRow {
                        row: index,
                        agent_id: row.agent.trim().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!(
            intervals = set.intervals.len(),
            skipped = set.skipped.len(),
            "Interval set built"
        );
        set
    }

    fn build_one(&self, index: usize, row: &EventRow) -> Result<Interval, RowError> {
        let event = StateEvent::parse(row, self.selection.duration_policy())?;
        let flagged = self.selection.is_flagged(&event.reason_code);

        Ok(Interval {
            row: index,
            agent_id: event.agent_id,
            reason_code: event.reason_code,
            start: event.start,
            end: event.end,
            flagged,
        })
    }
}
