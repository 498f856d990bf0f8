//! Coverage Aggregate
//!
//! Multi-module coverage aggregation for JaCoCo execution data.
//!
//! This crate provides the core implementation for the
//! `cov-aggregate` CLI tool: it locates the `.exec` files of every module
//! in a build graph, merges them, and renders one report with a group per
//! module.
//!
//! ## Getting Started
//!
//! ```bash
//! cargo install coverage-aggregate
//! cov-aggregate report --manifest reactor.toml
//! ```

pub mod aggregator;
pub mod commands;
pub mod discovery;
pub mod exec;
pub mod output;
pub mod reactor;
pub mod report;
pub mod utils;
