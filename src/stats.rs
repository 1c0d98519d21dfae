use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::SelectionConfig;
use crate::events::EventRow;
use crate::intervals::Interval;

/// Headline counts over the raw input, before any overlap work.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct InputSummary {
    pub total_records: usize,
    pub unique_agents: usize,
    pub not_ready_records: usize,
    pub flagged_records: usize,
}

impl InputSummary {
    pub fn from_rows(rows: &[EventRow], selection: &SelectionConfig) -> Self {
        let mut agents = HashSet::new();
        let mut s = InputSummary {
            total_records: rows.len(),
            ..Default::default()
        };

        for row in rows {
            agents.insert(row.agent.trim());

            if row.is_not_ready() {
                s.not_ready_records += 1;
            }

            if selection.is_flagged(row.reason_code()) {
                s.flagged_records += 1;
            }
        }

        s.unique_agents = agents.len();
        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn not_ready_pct(&self) -> f64 {
        Self::pct(self.not_ready_records, self.total_records)
    }
}

/// How often a reason code occurs among the built intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasonCount {
    pub reason_code: String,
    pub count: usize,
}

/// Reason-code frequencies, most frequent first, ties by code.
pub fn reason_code_counts(intervals: &[Interval]) -> Vec<ReasonCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for interval in intervals {
        *counts.entry(interval.reason_code.as_str()).or_default() += 1;
    }

    let mut out: Vec<ReasonCount> = counts
        .into_iter()
        .map(|(code, count)| ReasonCount {
            reason_code: code.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.reason_code.cmp(&b.reason_code)));
    out
}
