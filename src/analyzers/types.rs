//! Summary views computed from an overlap record set.

use serde::Serialize;

use crate::overlap::Category;

/// Count and duration totals over a set of overlaps.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlapSummary {
    pub(crate) count: usize,
    pub(crate) total_duration_secs: i64,
    pub(crate) mean_duration_secs: f64,
    pub(crate) max_duration_secs: i64,
}

/// Per-category counts and duration distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub(crate) category: Category,
    pub(crate) count: usize,
    pub(crate) percentage: f64,
    pub(crate) mean_duration_secs: f64,
    pub(crate) median_duration_secs: f64,
    pub(crate) stddev_duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub(crate) hour: u32,
    pub(crate) count: usize,
}

/// Overlap count for a two-hour slot such as `"12-13"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePeriodCount {
    pub(crate) period: String,
    pub(crate) count: usize,
}

/// How one agent took part in the overlap set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentBreakdown {
    pub(crate) agent: String,
    pub(crate) total_overlaps: usize,
    /// Overlaps in which this agent's interval was flagged.
    pub(crate) flagged_count: usize,
    /// Overlaps in which this agent was not flagged but the other agent was.
    pub(crate) counterpart_flagged_count: usize,
    pub(crate) total_duration_secs: i64,
    pub(crate) mean_duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayBreakdown {
    pub(crate) day: String,
    pub(crate) count: usize,
    pub(crate) total_duration_secs: i64,
}

/// An agent pair ranked by how often both were flagged at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairRanking {
    pub(crate) agent_a: String,
    pub(crate) agent_b: String,
    pub(crate) incidents: usize,
    pub(crate) total_duration_secs: i64,
}

/// Every summary view over one overlap set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateViews {
    pub(crate) summary: OverlapSummary,
    pub(crate) categories: Vec<CategoryBreakdown>,
    pub(crate) hourly: Vec<HourCount>,
    pub(crate) peak_hours: Vec<HourCount>,
    pub(crate) time_periods: Vec<TimePeriodCount>,
    pub(crate) agents: Vec<AgentBreakdown>,
    pub(crate) weekdays: Vec<WeekdayBreakdown>,
    pub(crate) both_flagged: OverlapSummary,
    pub(crate) both_flagged_hourly: Vec<HourCount>,
    pub(crate) peak_both_flagged_hour: Option<u32>,
    pub(crate) top_pairs: Vec<PairRanking>,
}

impl OverlapSummary {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total_duration_secs(&self) -> i64 {
        self.total_duration_secs
    }

    pub fn mean_duration_secs(&self) -> f64 {
        self.mean_duration_secs
    }

    pub fn max_duration_secs(&self) -> i64 {
        self.max_duration_secs
    }
}

impl AggregateViews {
    pub fn summary(&self) -> &OverlapSummary {
        &self.summary
    }

    pub fn both_flagged(&self) -> &OverlapSummary {
        &self.both_flagged
    }

    pub fn peak_both_flagged_hour(&self) -> Option<u32> {
        self.peak_both_flagged_hour
    }

    pub fn top_pairs(&self) -> &[PairRanking] {
        &self.top_pairs
    }

    pub fn agents(&self) -> &[AgentBreakdown] {
        &self.agents
    }

    pub fn categories(&self) -> &[CategoryBreakdown] {
        &self.categories
    }
}

impl CategoryBreakdown {
    pub fn category(&self) -> Category {
        self.category
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl AgentBreakdown {
    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn total_overlaps(&self) -> usize {
        self.total_overlaps
    }
}

impl PairRanking {
    pub fn agents(&self) -> (&str, &str) {
        (&self.agent_a, &self.agent_b)
    }

    pub fn incidents(&self) -> usize {
        self.incidents
    }
}
