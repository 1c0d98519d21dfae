//! Overlap detection between agents' Not-Ready intervals.
//!
//! [`detect`] finds every cross-agent pair of intervals whose time ranges
//! strictly intersect, [`classify`] labels each pair by which side was flagged,
//! and [`OverlapFilter`] narrows the resulting records before aggregation.

pub mod classify;
pub mod detect;
pub mod filter;
pub mod types;

pub use classify::classify;
pub use detect::{Strategy, detect, detect_pairwise, detect_parallel, detect_sweep};
pub use filter::OverlapFilter;
pub use types::{Category, OverlapRecord, SelectionMode};
