//! Pair search over Not-Ready intervals.
//!
//! Three strategies share one pair predicate ([`overlap_pair`]) and therefore
//! produce the same records:
//!
//! | Strategy            | Cost                       |
//! |---------------------|----------------------------|
//! | [`detect_pairwise`] | O(n²)                      |
//! | [`detect_sweep`]    | O(n log n + active visits) |
//! | [`detect_parallel`] | sweep split across workers |

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::ConfigError;
use crate::intervals::Interval;
use crate::overlap::classify::classify;
use crate::overlap::types::{OverlapRecord, SelectionMode};

/// Single-threaded search strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    Pairwise,
    #[default]
    Sweep,
}

/// Runs `strategy` and returns records in `(row_a, row_b)` order.
pub fn detect(intervals: &[Interval], mode: SelectionMode, strategy: Strategy) -> Vec<OverlapRecord> {
    let mut records = match strategy {
        Strategy::Pairwise => detect_pairwise(intervals, mode),
        Strategy::Sweep => detect_sweep(intervals, mode),
    };
    sort_canonical(&mut records);
    debug!(?strategy, intervals = intervals.len(), overlaps = records.len(), "Detection finished");
    records
}

/// Compares every pair of intervals.
pub fn detect_pairwise(intervals: &[Interval], mode: SelectionMode) -> Vec<OverlapRecord> {
    let mut records = Vec::new();

    for (i, first) in intervals.iter().enumerate() {
        for second in &intervals[i + 1..] {
            if let Some(record) = overlap_pair(first, second, mode) {
                records.push(record);
            }
        }
    }

    records
}

/// Sweeps intervals by start time, keeping the still-open ones ordered by end time.
pub fn detect_sweep(intervals: &[Interval], mode: SelectionMode) -> Vec<OverlapRecord> {
    let mut records = Vec::new();
    let mut active: BTreeSet<(NaiveDateTime, usize)> = BTreeSet::new();

    for idx in start_order(intervals) {
        let current = &intervals[idx];

        while let Some(&(end, _)) = active.first() {
            if end > current.start {
                break;
            }
            active.pop_first();
        }

        for &(_, other) in &active {
            if let Some(record) = overlap_pair(&intervals[other], current, mode) {
                records.push(record);
            }
        }

        // zero-length intervals can never intersect anything
        if current.end > current.start {
            active.insert((current.end, idx));
        }
    }

    records
}

/// Splits the start-sorted interval list into `workers` chunks and scans each
/// chunk on a blocking task. Records come back in `(row_a, row_b)` order.
///
/// # Errors
///
/// Fails with [`ConfigError::ZeroWorkers`] if `workers` is 0, or if a worker task panics.
pub async fn detect_parallel(
    intervals: Arc<Vec<Interval>>,
    mode: SelectionMode,
    workers: usize,
) -> Result<Vec<OverlapRecord>> {
    if workers == 0 {
        return Err(ConfigError::ZeroWorkers.into());
    }

    let order = Arc::new(start_order(&intervals));
    let chunk = order.len().div_ceil(workers).max(1);
    debug!(workers, chunk, intervals = order.len(), "Starting parallel detection");

    let mut tasks = Vec::new();
    for lo in (0..order.len()).step_by(chunk) {
        let hi = (lo + chunk).min(order.len());
        let intervals = Arc::clone(&intervals);
        let order = Arc::clone(&order);

        tasks.push(tokio::task::spawn_blocking(move || {
            scan_forward(&intervals, &order, lo..hi, mode)
        }));
    }

    let mut records = Vec::new();
    for task in tasks {
        records.extend(task.await?);
    }
    sort_canonical(&mut records);

    Ok(records)
}

/// For each position in `range`, tests the interval against every later one in
/// start order until a later interval starts at or after its end.
fn scan_forward(
    intervals: &[Interval],
    order: &[usize],
    range: Range<usize>,
    mode: SelectionMode,
) -> Vec<OverlapRecord> {
    let mut records = Vec::new();

    for pos in range {
        let current = &intervals[order[pos]];
        for &next in &order[pos + 1..] {
            let other = &intervals[next];
            if other.start >= current.end {
                break;
            }
            if let Some(record) = overlap_pair(current, other, mode) {
                records.push(record);
            }
        }
    }

    records
}

/// Indices of `intervals` sorted by `(start, row)`.
fn start_order(intervals: &[Interval]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by_key(|&i| (intervals[i].start, intervals[i].row));
    order
}

fn sort_canonical(records: &mut [OverlapRecord]) {
    records.sort_by_key(|r| (r.row_a, r.row_b));
}

/// The pair predicate shared by every strategy.
///
/// Returns a record iff the agents differ, the selection mode is satisfied and
/// the intersection is strictly positive. Slot A is the interval with the lower row.
pub(crate) fn overlap_pair(x: &Interval, y: &Interval, mode: SelectionMode) -> Option<OverlapRecord> {
    if x.agent_id == y.agent_id {
        return None;
    }

    if mode == SelectionMode::RequireFlagged && !(x.flagged || y.flagged) {
        return None;
    }

    let window_start = x.start.max(y.start);
    let window_end = x.end.min(y.end);
    if window_start >= window_end {
        return None;
    }

    let (a, b) = if x.row <= y.row { (x, y) } else { (y, x) };

    Some(OverlapRecord {
        agent_a: a.agent_id.clone(),
        agent_b: b.agent_id.clone(),
        row_a: a.row,
        row_b: b.row,
        window_start,
        window_end,
        duration_secs: (window_end - window_start).num_seconds(),
        reason_a: a.reason_code.clone(),
        reason_b: b.reason_code.clone(),
        flagged_a: a.flagged,
        flagged_b: b.flagged,
        category: classify(a.flagged, b.flagged),
    })
}
