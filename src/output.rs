//! Output formatting and persistence for overlap analyses.
//!
//! Supports pretty-printing, JSON serialization, the overlap CSV export, and
//! appending one summary row per run to a history CSV.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::analyzer::Analysis;
use crate::analyzers::types::AggregateViews;
use crate::overlap::OverlapRecord;

const EXPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logs aggregate views using Rust's debug pretty-print format.
pub fn print_pretty(views: &AggregateViews) {
    debug!("{:#?}", views);
}

/// Logs aggregate views as pretty-printed JSON.
pub fn print_json(views: &AggregateViews) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(views)?);
    Ok(())
}

/// Formats whole seconds as `{h}h {m}m {s}s`.
pub fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// The exported projection of an [`OverlapRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub agent_a: String,
    pub agent_b: String,
    pub overlap_start: String,
    pub overlap_end: String,
    pub duration: String,
    pub reason_a: String,
    pub reason_b: String,
    pub overlap_type: String,
}

impl From<&OverlapRecord> for ExportRow {
    fn from(r: &OverlapRecord) -> Self {
        ExportRow {
            agent_a: r.agent_a.clone(),
            agent_b: r.agent_b.clone(),
            overlap_start: r.window_start.format(EXPORT_TIME_FORMAT).to_string(),
            overlap_end: r.window_end.format(EXPORT_TIME_FORMAT).to_string(),
            duration: format_duration(r.duration_secs),
            reason_a: r.reason_a.clone(),
            reason_b: r.reason_b.clone(),
            overlap_type: r.category_label(),
        }
    }
}

/// Export rows, most recent window first.
pub fn export_rows(records: &[OverlapRecord]) -> Vec<ExportRow> {
    let mut sorted: Vec<&OverlapRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.window_start
            .cmp(&a.window_start)
            .then_with(|| (a.row_a, a.row_b).cmp(&(b.row_a, b.row_b)))
    });
    sorted.into_iter().map(ExportRow::from).collect()
}

/// Writes the overlap export as CSV with a header row.
pub fn write_export<W: Write>(writer: W, records: &[OverlapRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for row in export_rows(records) {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the overlap export to `path`, replacing any existing file.
pub fn write_export_file(path: &str, records: &[OverlapRecord]) -> Result<()> {
    debug!(path, records = records.len(), "Writing overlap export");
    write_export(File::create(path)?, records)
}

/// One line of run history.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunRecord {
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub selection_codes: String,
    pub total_records: usize,
    pub skipped_rows: usize,
    pub overlaps: usize,
    pub total_duration_secs: i64,
    pub mean_duration_secs: f64,
    pub both_flagged: usize,
}

impl RunRecord {
    pub fn from_analysis(source: &str, codes: &[&str], analysis: &Analysis) -> Self {
        let summary = analysis.views.summary();
        RunRecord {
            timestamp: Utc::now(),
            source: source.to_string(),
            selection_codes: codes.join(";"),
            total_records: analysis.input.total_records,
            skipped_rows: analysis.skipped.len(),
            overlaps: summary.count(),
            total_duration_secs: summary.total_duration_secs(),
            mean_duration_secs: summary.mean_duration_secs(),
            both_flagged: analysis.views.both_flagged().count(),
        }
    }
}

/// Appends a [`RunRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &RunRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // header only on first write
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}
