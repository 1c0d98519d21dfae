pub mod analyzers;
pub mod config;
pub mod error;
pub mod events;
pub mod intervals;
pub mod output;
pub mod overlap;
pub mod stats;
