//! Coverage Aggregate CLI
//!
//! Merges JaCoCo execution data across the modules of a multi-module build
//! and renders a single grouped report.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use coverage_aggregate::commands::{
    display_exec_info, display_modules, display_version, execute_find, execute_merge,
    execute_report, validate_args, validate_summary_file, ReportArgs,
};
use coverage_aggregate::utils::config::{ReportFormat, DEFAULT_SOURCE_ENCODING};

/// Coverage Aggregate - one coverage report for a multi-module build
#[derive(Parser, Debug)]
#[command(name = "cov-aggregate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the aggregate report
    Report {
        /// Reactor manifest (TOML or JSON)
        #[arg(short, long, env = "COV_AGGREGATE_MANIFEST")]
        manifest: PathBuf,

        /// Configuration file (TOML)
        #[arg(short, long, env = "COV_AGGREGATE_CONFIG")]
        config: Option<PathBuf>,

        /// Title of the root report group
        #[arg(long)]
        title: Option<String>,

        /// Output directory (`jacoco-aggregate` is appended unless already last)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Reporting output root, used when no output directory is given
        #[arg(long)]
        reporting_output: Option<PathBuf>,

        /// Report formats (repeatable)
        #[arg(short, long, value_enum)]
        format: Vec<ReportFormat>,

        /// Class file include pattern (repeatable)
        #[arg(long)]
        include: Vec<String>,

        /// Class file exclude pattern (repeatable)
        #[arg(long)]
        exclude: Vec<String>,

        /// Execution data include pattern (repeatable)
        #[arg(long)]
        data_include: Vec<String>,

        /// Execution data exclude pattern (repeatable)
        #[arg(long)]
        data_exclude: Vec<String>,

        /// Source file encoding
        #[arg(long)]
        encoding: Option<String>,

        /// Skip report generation
        #[arg(long, env = "COV_AGGREGATE_SKIP")]
        skip: bool,

        /// Run even if the manifest marks the current module as non-root
        #[arg(long)]
        force_root: bool,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// List execution data files under a directory
    Find {
        /// Base directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Include pattern (repeatable, default `target/*.exec`)
        #[arg(short, long)]
        include: Vec<String>,

        /// Exclude pattern (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Show which modules contribute to the report
    Modules {
        /// Reactor manifest (TOML or JSON)
        #[arg(short, long, env = "COV_AGGREGATE_MANIFEST")]
        manifest: PathBuf,

        /// Encoding for modules that declare none
        #[arg(long, default_value = DEFAULT_SOURCE_ENCODING)]
        encoding: String,
    },

    /// Dump the contents of an execution data file
    Info {
        /// Execution data file
        file: PathBuf,

        /// List every class record
        #[arg(long)]
        classes: bool,
    },

    /// Merge execution data files into one
    Merge {
        /// Input files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "merged.exec")]
        output: PathBuf,
    },

    /// Validate a JSON summary file
    Validate {
        /// Path to summary JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Report {
            manifest,
            config,
            title,
            output,
            reporting_output,
            format,
            include,
            exclude,
            data_include,
            data_exclude,
            encoding,
            skip,
            force_root,
            summary,
        } => {
            let args = ReportArgs {
                manifest,
                config,
                title,
                output_directory: output,
                reporting_output_directory: reporting_output,
                formats: format,
                includes: include,
                excludes: exclude,
                data_file_includes: data_include,
                data_file_excludes: data_exclude,
                source_encoding: encoding,
                skip,
                execution_root: force_root,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_report(args)?;
        }

        Commands::Find {
            dir,
            include,
            exclude,
        } => {
            execute_find(&dir, &include, &exclude)?;
        }

        Commands::Modules { manifest, encoding } => {
            display_modules(&manifest, &encoding)?;
        }

        Commands::Info { file, classes } => {
            display_exec_info(&file, classes)?;
        }

        Commands::Merge { files, output } => {
            execute_merge(&files, &output)?;
        }

        Commands::Validate { file } => {
            validate_summary_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
