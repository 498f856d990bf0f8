//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while locating files below a directory
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error(transparent)]
    Pattern(#[from] ConfigError),

    #[error("Failed to scan {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Errors raised while loading the reactor manifest
#[derive(Error, Debug)]
pub enum ReactorError {
    #[error("Failed to read reactor manifest {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML manifest: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate module identifier: {0}")]
    DuplicateModule(String),

    #[error("Invalid module: {0}")]
    InvalidModule(String),
}

/// Errors that can occur while reading or merging execution data
#[derive(Error, Debug)]
pub enum ExecDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid execution data file")]
    InvalidFile,

    #[error("Invalid execution data file: bad magic number {0:#06x}")]
    BadMagic(u16),

    #[error("Incompatible execution data version {found:#06x} (expected {expected:#06x})")]
    IncompatibleVersion { found: u16, expected: u16 },

    #[error("Unknown block type {0:#04x}")]
    UnknownBlock(u8),

    #[error("Malformed string in execution data: {0}")]
    MalformedString(String),

    #[error("Different class names {existing} and {incoming} for id {id:016x}")]
    ClassNameConflict {
        id: u64,
        existing: String,
        incoming: String,
    },

    #[error("Incompatible execution data for class {name} with id {id:016x}")]
    ProbeCountConflict { id: u64, name: String },
}

/// Errors that can occur while rendering a report
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write XML: {0}")]
    Xml(String),

    #[error("Failed to scan class files: {0}")]
    Scan(String),

    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that abort a whole aggregation run
#[derive(Error, Debug)]
pub enum AggregateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Failed to load execution data from {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: ExecDataError,
    },

    #[error(transparent)]
    Render(#[from] RenderError),
}
