//! Multi-module coverage aggregation.
//!
//! This module ties the pieces of a run together:
//! - Gatekeeping (defer until the build root)
//! - Loading every located execution data file into one accumulator
//! - Rendering one grouped report keyed by module

pub mod driver;
pub mod gatekeeper;
pub mod run;

// Re-export main types and functions
pub use driver::{LoadedCoverage, ReportDriver, RunSummary};
pub use gatekeeper::can_run;
pub use run::{Aggregator, RunOutcome, RunState};
