use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::AggregateViews;
use crate::config::SelectionConfig;
use crate::error::ConfigError;
use crate::events::EventRow;
use crate::intervals::{Interval, IntervalBuilder, SkippedRow};
use crate::overlap::{OverlapFilter, OverlapRecord, Strategy, detect, detect_parallel};
use crate::stats::{InputSummary, ReasonCount, reason_code_counts};

/// How a run searches for overlaps and which records reach the aggregator.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub strategy: Strategy,
    /// More than one worker switches to [`detect_parallel`].
    pub workers: usize,
    pub filter: OverlapFilter,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Sweep,
            workers: 1,
            filter: OverlapFilter::default(),
        }
    }
}

/// Everything one analysis run produces.
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub input: InputSummary,
    pub skipped: Vec<SkippedRow>,
    /// Reason codes seen on Not-Ready intervals, for diagnosing empty results.
    pub reason_codes: Vec<ReasonCount>,
    pub detected: usize,
    /// Records that passed the filter, in `(row_a, row_b)` order.
    pub records: Vec<OverlapRecord>,
    pub views: AggregateViews,
}

/// Runs the full pipeline on one thread.
///
/// Detection always uses `options.strategy` here; a worker count above one is
/// accepted but only [`run_analysis`] fans detection out.
///
/// # Errors
///
/// Fails before any work if the filter or worker count is invalid.
pub fn analyze(
    rows: &[EventRow],
    selection: &SelectionConfig,
    options: &AnalysisOptions,
) -> Result<Analysis> {
    options.filter.validate()?;
    if options.workers == 0 {
        return Err(ConfigError::ZeroWorkers.into());
    }
    if options.workers > 1 {
        debug!(workers = options.workers, "Synchronous run, detecting on one thread");
    }

    let (input, intervals, skipped) = prepare(rows, selection);
    let records = detect(&intervals, selection.mode(), options.strategy);

    Ok(finish(input, &intervals, skipped, records, &options.filter))
}

/// Runs the full pipeline, spreading detection over `options.workers` blocking tasks.
///
/// # Errors
///
/// Fails before any work if the filter or worker count is invalid.
#[tracing::instrument(skip_all, fields(rows = rows.len(), workers = options.workers))]
pub async fn run_analysis(
    rows: &[EventRow],
    selection: &SelectionConfig,
    options: &AnalysisOptions,
) -> Result<Analysis> {
    options.filter.validate()?;

    let (input, intervals, skipped) = prepare(rows, selection);

    let (intervals, records) = if options.workers > 1 {
        let shared = Arc::new(intervals);
        let records = detect_parallel(Arc::clone(&shared), selection.mode(), options.workers).await?;
        (Arc::unwrap_or_clone(shared), records)
    } else if options.workers == 1 {
        let records = detect(&intervals, selection.mode(), options.strategy);
        (intervals, records)
    } else {
        return Err(ConfigError::ZeroWorkers.into());
    };

    Ok(finish(input, &intervals, skipped, records, &options.filter))
}

fn prepare(
    rows: &[EventRow],
    selection: &SelectionConfig,
) -> (InputSummary, Vec<Interval>, Vec<SkippedRow>) {
    let input = InputSummary::from_rows(rows, selection);
    let set = IntervalBuilder::new(selection).build(rows);

    info!(
        total_records = input.total_records,
        unique_agents = input.unique_agents,
        not_ready = input.not_ready_records,
        flagged = input.flagged_records,
        intervals = set.intervals.len(),
        skipped = set.skipped.len(),
        "Input prepared"
    );

    (input, set.intervals, set.skipped)
}

fn finish(
    input: InputSummary,
    intervals: &[Interval],
    skipped: Vec<SkippedRow>,
    records: Vec<OverlapRecord>,
    filter: &OverlapFilter,
) -> Analysis {
    let detected = records.len();
    let records = if filter.is_empty() {
        records
    } else {
        let kept = filter.apply(&records);
        debug!(detected, kept = kept.len(), "Filter applied");
        kept
    };

    let views = aggregate(&records);
    info!(
        detected,
        reported = records.len(),
        both_flagged = views.both_flagged().count(),
        "Analysis complete"
    );

    Analysis {
        input,
        skipped,
        reason_codes: reason_code_counts(intervals),
        detected,
        records,
        views,
    }
}
