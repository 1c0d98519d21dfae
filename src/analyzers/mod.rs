//! Overlap aggregation and run orchestration.
//!
//! This module turns a detected overlap set into summary views (totals,
//! category, hour, weekday, agent and agent-pair breakdowns) and wires the
//! interval builder, detector and aggregator into one analysis run.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
