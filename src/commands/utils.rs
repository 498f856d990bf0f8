use crate::output::json::SUMMARY_SCHEMA_VERSION;
use crate::output::read_summary;
use crate::utils::config::{EXEC_FORMAT_VERSION, OUTPUT_NAME, REPORT_NAME};
use anyhow::{Context, Result};
use std::path::Path;

/// Validate a JSON summary written by a previous report run
pub fn validate_summary_file(file_path: &Path) -> Result<()> {
    println!("Validating summary: {}", file_path.display());

    let summary = read_summary(file_path)
        .with_context(|| format!("Failed to read summary {}", file_path.display()))?;

    println!("✓ Valid summary JSON");
    println!("  Version: {}", summary.version);
    println!("  Title: {}", summary.title);
    println!(
        "  Probes: {}/{} ({:.1}%)",
        summary.probes.covered,
        summary.probes.missed + summary.probes.covered,
        summary.probes.percentage
    );
    println!("  Modules: {}", summary.modules.len());
    println!("  Exec files: {}", summary.exec_files.len());

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("{} v{}", REPORT_NAME, env!("CARGO_PKG_VERSION"));
    println!("Execution data format: {:#06x}", EXEC_FORMAT_VERSION);
    println!("Summary schema: v{}", SUMMARY_SCHEMA_VERSION);
    println!("Output name: {}", OUTPUT_NAME);
}
