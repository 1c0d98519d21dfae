//! Typed errors raised by the analysis core.

use thiserror::Error;

/// A single input row could not be turned into a [`StateEvent`](crate::events::StateEvent).
///
/// Row errors are recoverable: the row is skipped and reported, the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("malformed timestamp: {value:?}")]
    MalformedTimestamp { value: String },

    #[error("malformed duration: {value:?}")]
    MalformedDuration { value: String },
}

/// The run configuration is unusable. Raised before any detection work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("selection code at position {index} is blank")]
    BlankSelectionCode { index: usize },

    #[error("selection filtering is enabled but no selection codes are configured")]
    NoSelectionCodes,

    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("filter date range is inverted: {from} is after {to}")]
    InvertedDateRange { from: String, to: String },
}
