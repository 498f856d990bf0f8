//! Report command implementation.
//!
//! The report command:
//! 1. Loads configuration and applies command-line overrides
//! 2. Reads the reactor manifest
//! 3. Runs the aggregation (gate, load, render)
//! 4. Prints a summary

use crate::aggregator::{Aggregator, RunOutcome, RunSummary};
use crate::exec::ExecFileLoader;
use crate::reactor::BuildGraph;
use crate::report::FormatRenderer;
use crate::utils::config::{AggregateConfig, ReportFormat};
use anyhow::{bail, Context, Result};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the report command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct ReportArgs {
    /// Reactor manifest describing the build graph
    pub manifest: PathBuf,

    /// Optional TOML configuration file
    pub config: Option<PathBuf>,

    pub title: Option<String>,
    pub output_directory: Option<PathBuf>,
    pub reporting_output_directory: Option<PathBuf>,

    /// Formats to render; empty keeps the configured ones
    pub formats: Vec<ReportFormat>,

    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub data_file_includes: Vec<String>,
    pub data_file_excludes: Vec<String>,
    pub source_encoding: Option<String>,
    pub skip: bool,

    /// Force the run even when the manifest marks a non-root module
    pub execution_root: bool,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl ReportArgs {
    /// Merge command-line overrides into the file configuration
    ///
    /// List arguments replace the configured list when non-empty.
    pub fn apply_to(&self, mut config: AggregateConfig) -> AggregateConfig {
        if let Some(title) = &self.title {
            config.title = Some(title.clone());
        }
        if let Some(dir) = &self.output_directory {
            config.output_directory = Some(dir.clone());
        }
        if let Some(dir) = &self.reporting_output_directory {
            config.reporting_output_directory = Some(dir.clone());
        }
        if let Some(encoding) = &self.source_encoding {
            config.source_encoding = encoding.clone();
        }
        if !self.formats.is_empty() {
            config.formats = self.formats.clone();
        }
        if !self.includes.is_empty() {
            config.includes = self.includes.clone();
        }
        if !self.excludes.is_empty() {
            config.excludes = self.excludes.clone();
        }
        if !self.data_file_includes.is_empty() {
            config.data_file_includes = self.data_file_includes.clone();
        }
        if !self.data_file_excludes.is_empty() {
            config.data_file_excludes = self.data_file_excludes.clone();
        }
        config.skip |= self.skip;
        config
    }
}

/// Validate report arguments before doing any work
///
/// **Public** - called by main.rs before execution
pub fn validate_args(args: &ReportArgs) -> Result<()> {
    if !args.manifest.is_file() {
        bail!("Reactor manifest not found: {}", args.manifest.display());
    }
    if let Some(config) = &args.config {
        if !config.is_file() {
            bail!("Config file not found: {}", config.display());
        }
    }
    Ok(())
}

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The run summary, or None when the run was skipped
///
/// # Errors
/// * Config or manifest parse errors
/// * Execution data load failures
/// * Render and write failures
pub fn execute_report(args: ReportArgs) -> Result<Option<RunSummary>> {
    let start_time = Instant::now();

    let file_config = match &args.config {
        Some(path) => AggregateConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AggregateConfig::default(),
    };
    let config = args.apply_to(file_config);

    let mut graph = BuildGraph::from_file(&args.manifest, &config.source_encoding)
        .with_context(|| format!("Failed to read reactor manifest {}", args.manifest.display()))?;
    if args.execution_root {
        graph.execution_root = true;
    }

    info!("Aggregating coverage for {}", graph.root.id);

    let settings = config
        .validate(&graph.root.base_dir, &graph.root.id.artifact)
        .context("Invalid aggregate configuration")?;

    let mut renderer = FormatRenderer::new(&settings.output_directory, settings.formats.clone());
    let outcome = Aggregator::new(&settings)
        .run(&graph, &ExecFileLoader, &mut renderer)
        .context("Aggregate report generation failed")?;

    let summary = match outcome {
        RunOutcome::Skipped => return Ok(None),
        RunOutcome::Completed(summary) => summary,
    };

    for path in renderer.written() {
        info!("✓ Written: {}", path.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("AGGREGATE COVERAGE SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Title:      {}", summary.title);
        println!("Groups:     {}", summary.groups.join(", "));
        println!("Exec files: {}", summary.exec_files.len());
        println!("Sessions:   {}", summary.sessions);
        println!("Classes:    {}", summary.classes);
        println!("Probes:     {}/{}", summary.covered_probes, summary.probes);
        if let Some(analysis) = renderer.analysis() {
            println!("\n{}", analysis.summary());
        }
        println!("Output:     {}", renderer.output_dir().display());
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Report completed in {:.2}s", elapsed.as_secs_f64());

    Ok(Some(summary))
}
