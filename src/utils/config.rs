//! Configuration and constants for the aggregator.
//!
//! `AggregateConfig` is the raw, serde-friendly form read from a TOML file
//! and overridden by CLI flags. `validate` turns it into `AggregateSettings`
//! with every glob compiled, so pattern errors surface before any file I/O.

use crate::discovery::FileFilter;
use crate::utils::error::ConfigError;
use clap::ValueEnum;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Execution data files collected when no include pattern is configured
pub const DEFAULT_DATA_FILE_INCLUDE: &str = "target/*.exec";

/// Class files considered when no include pattern is configured
pub const DEFAULT_CLASS_FILE_INCLUDE: &str = "**/*.class";

/// Directory segment every aggregate report lives under
pub const AGGREGATE_DIR_NAME: &str = "jacoco-aggregate";

/// Index name of the report, relative to the reporting output root
pub const OUTPUT_NAME: &str = "jacoco-aggregate/index";

/// Human-readable report name
pub const REPORT_NAME: &str = "Coverage Aggregate";

/// Default encoding for source files
pub const DEFAULT_SOURCE_ENCODING: &str = "UTF-8";

/// Reporting output directory used when none is configured, relative to the root module
pub const DEFAULT_REPORTING_DIR: &str = "target/site";

// Execution data file format (JaCoCo exec)
pub const EXEC_MAGIC: u16 = 0xC0C0;
pub const EXEC_FORMAT_VERSION: u16 = 0x1007;
pub const BLOCK_HEADER: u8 = 0x01;
pub const BLOCK_SESSION_INFO: u8 = 0x10;
pub const BLOCK_EXECUTION_DATA: u8 = 0x11;

/// Source file extensions searched when linking classes to sources
pub const SOURCE_EXTENSIONS: &[&str] = &["java", "kt", "groovy", "scala"];

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Xml,
    Csv,
    Json,
}

impl ReportFormat {
    pub fn all() -> Vec<ReportFormat> {
        vec![
            ReportFormat::Html,
            ReportFormat::Xml,
            ReportFormat::Csv,
            ReportFormat::Json,
        ]
    }

    /// File name written inside the output directory
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Html => "index.html",
            ReportFormat::Xml => "jacoco.xml",
            ReportFormat::Csv => "jacoco.csv",
            ReportFormat::Json => "summary.json",
        }
    }
}

/// Raw aggregation configuration
///
/// **Public** - loaded from TOML, then overridden from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Title of the root report group (defaults to the root module's artifact)
    pub title: Option<String>,

    /// Encoding of source files
    pub source_encoding: String,

    /// Class file include patterns, relative to each class directory
    pub includes: Vec<String>,

    /// Class file exclude patterns
    pub excludes: Vec<String>,

    /// Execution data include patterns, relative to each module base dir
    pub data_file_includes: Vec<String>,

    /// Execution data exclude patterns
    pub data_file_excludes: Vec<String>,

    /// Explicit output directory for the aggregate report
    pub output_directory: Option<PathBuf>,

    /// Reporting output root (defaults to `<root>/target/site`)
    pub reporting_output_directory: Option<PathBuf>,

    /// Formats to render
    pub formats: Vec<ReportFormat>,

    /// Skip report generation entirely
    pub skip: bool,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            title: None,
            source_encoding: DEFAULT_SOURCE_ENCODING.to_string(),
            includes: Vec::new(),
            excludes: Vec::new(),
            data_file_includes: Vec::new(),
            data_file_excludes: Vec::new(),
            output_directory: None,
            reporting_output_directory: None,
            formats: ReportFormat::all(),
            skip: false,
        }
    }
}

impl AggregateConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// * `ConfigError::ReadFailed` - file cannot be read
    /// * `ConfigError::ParseFailed` - invalid TOML or unknown values
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Reading config from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate and compile the configuration
    ///
    /// **Public** - must run before the aggregation starts
    ///
    /// # Arguments
    /// * `root_base_dir` - base directory of the aggregating module
    /// * `default_title` - title used when none is configured
    ///
    /// # Errors
    /// * `ConfigError::InvalidPattern` - any include/exclude glob is malformed
    /// * `ConfigError::Invalid` - empty encoding or title
    pub fn validate(
        &self,
        root_base_dir: &Path,
        default_title: &str,
    ) -> Result<AggregateSettings, ConfigError> {
        if self.source_encoding.trim().is_empty() {
            return Err(ConfigError::Invalid("source encoding cannot be empty".to_string()));
        }

        let title = self
            .title
            .clone()
            .unwrap_or_else(|| default_title.to_string());
        if title.trim().is_empty() {
            return Err(ConfigError::Invalid("report title cannot be empty".to_string()));
        }

        let data_filter =
            FileFilter::for_data_files(&self.data_file_includes, &self.data_file_excludes)?;
        let class_filter =
            FileFilter::new(&self.includes, &self.excludes, DEFAULT_CLASS_FILE_INCLUDE)?;

        let reporting_output = self
            .reporting_output_directory
            .clone()
            .unwrap_or_else(|| root_base_dir.join(DEFAULT_REPORTING_DIR));
        let output_directory =
            resolve_output_directory(&reporting_output, self.output_directory.as_deref());

        let mut formats = Vec::new();
        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }

        Ok(AggregateSettings {
            title,
            source_encoding: self.source_encoding.clone(),
            data_filter,
            class_filter,
            output_directory,
            formats,
            skip: self.skip,
        })
    }
}

/// Validated configuration for one aggregation run
#[derive(Debug, Clone)]
pub struct AggregateSettings {
    pub title: String,
    pub source_encoding: String,
    pub data_filter: FileFilter,
    pub class_filter: FileFilter,
    pub output_directory: PathBuf,
    pub formats: Vec<ReportFormat>,
    pub skip: bool,
}

impl AggregateSettings {
    /// Reporting preconditions, independent of the build graph position
    pub fn can_generate_report(&self) -> Result<(), String> {
        if self.skip {
            return Err("report generation is skipped by configuration".to_string());
        }
        if self.formats.is_empty() {
            return Err("no report formats configured".to_string());
        }
        Ok(())
    }
}

/// Resolve the directory the aggregate report is written to
///
/// **Public** - implements the output location contract
///
/// Without an override the report goes to `<reporting_output>/jacoco-aggregate`.
/// An override whose last segment is not `jacoco-aggregate` gets that
/// segment appended; otherwise it is used unchanged.
pub fn resolve_output_directory(reporting_output: &Path, override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(dir) if dir.file_name().is_some_and(|name| name == AGGREGATE_DIR_NAME) => {
            dir.to_path_buf()
        }
        Some(dir) => dir.join(AGGREGATE_DIR_NAME),
        None => reporting_output.join(AGGREGATE_DIR_NAME),
    }
}
