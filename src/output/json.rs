//! JSON summary output writer.
//!
//! Writes a compact, versioned summary of the aggregate report for CI
//! tooling. Per-class detail lives in the XML and CSV outputs.

use super::{ensure_parent_dir, validate_output_path};
use crate::report::{Counter, GroupCoverage};
use crate::utils::error::OutputError;
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Current summary schema version
pub const SUMMARY_SCHEMA_VERSION: &str = "1.0.0";

/// Top-level summary structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// Schema version for compatibility checking
    pub version: String,

    /// Title of the root report group
    pub title: String,

    pub probes: CounterSummary,
    pub classes: CounterSummary,

    /// One entry per report module, in report order
    pub modules: Vec<ModuleSummary>,

    /// Number of sessions found in the execution data
    pub session_count: usize,

    /// Execution data files merged into the report
    pub exec_files: Vec<String>,

    /// Timestamp when the summary was generated
    pub generated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterSummary {
    pub missed: usize,
    pub covered: usize,
    pub percentage: f64,
}

impl From<Counter> for CounterSummary {
    fn from(counter: Counter) -> Self {
        Self {
            missed: counter.missed,
            covered: counter.covered,
            percentage: counter.percentage(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    pub name: String,
    pub probes: CounterSummary,
    pub classes: CounterSummary,
}

impl AggregateSummary {
    pub fn from_coverage(coverage: &GroupCoverage) -> Self {
        Self {
            version: SUMMARY_SCHEMA_VERSION.to_string(),
            title: coverage.title.clone(),
            probes: coverage.probes().into(),
            classes: coverage.class_counter().into(),
            modules: coverage
                .modules
                .iter()
                .map(|m| ModuleSummary {
                    name: m.name.clone(),
                    probes: m.probes().into(),
                    classes: m.class_counter().into(),
                })
                .collect(),
            session_count: coverage.sessions.len(),
            exec_files: coverage
                .exec_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Write the summary of an analysed group to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_summary(coverage: &GroupCoverage, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing summary to: {}", output_path.display());

    validate_output_path(output_path)?;
    ensure_parent_dir(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, &AggregateSummary::from_coverage(coverage))
        .map_err(OutputError::SerializationFailed)?;

    Ok(())
}

/// Read a summary from a JSON file
///
/// **Public** - useful for CI checks and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_summary(input_path: impl AsRef<Path>) -> Result<AggregateSummary, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading summary from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;

    let summary: AggregateSummary =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    debug!("Summary loaded: version {}, title {}", summary.version, summary.title);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::analysis::{ClassCoverage, ClassStatus, ModuleCoverage, PackageCoverage};

    fn create_test_coverage() -> GroupCoverage {
        GroupCoverage {
            title: "All".to_string(),
            modules: vec![ModuleCoverage {
                name: "g:core:1".to_string(),
                encoding: "UTF-8".to_string(),
                packages: vec![PackageCoverage {
                    name: "com/ex".to_string(),
                    classes: vec![ClassCoverage {
                        name: "com/ex/Foo".to_string(),
                        id: 1,
                        status: ClassStatus::Covered,
                        probes: Counter::new(1, 3),
                        source_file: None,
                    }],
                }],
                source_roots: Vec::new(),
            }],
            sessions: Vec::new(),
            exec_files: Vec::new(),
        }
    }

    #[test]
    fn test_write_and_read_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("summary.json");

        write_summary(&create_test_coverage(), &path).unwrap();
        let loaded = read_summary(&path).unwrap();

        assert_eq!(loaded.version, SUMMARY_SCHEMA_VERSION);
        assert_eq!(loaded.title, "All");
        assert_eq!(loaded.probes.covered, 3);
        assert_eq!(loaded.probes.percentage, 75.0);
        assert_eq!(loaded.modules[0].name, "g:core:1");
    }

    #[test]
    fn test_read_missing_summary_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(read_summary(temp_dir.path().join("nope.json")).is_err());
    }
}
