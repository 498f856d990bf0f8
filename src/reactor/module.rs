//! Build graph node types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Group/artifact/version triple identifying a module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl ModuleId {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// Dependency scope of a module relative to the aggregating module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Compile,
    Runtime,
    Provided,
    Test,
}

impl Scope {
    /// Whether modules of this scope get their own report group
    ///
    /// `test` modules only contribute execution data.
    pub fn contributes_classes(&self) -> bool {
        matches!(self, Scope::Compile | Scope::Runtime | Scope::Provided)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::Compile => "compile",
            Scope::Runtime => "runtime",
            Scope::Provided => "provided",
            Scope::Test => "test",
        };
        f.write_str(name)
    }
}

/// A module in the build graph
///
/// All paths are absolute once the manifest has been loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub id: ModuleId,
    pub base_dir: PathBuf,
    pub scope: Scope,
    pub class_dirs: Vec<PathBuf>,
    pub source_dirs: Vec<PathBuf>,
    pub encoding: String,
}

impl Module {
    /// Module with conventional `target/classes` and `src/main/java` layout
    pub fn new(id: ModuleId, base_dir: impl Into<PathBuf>, scope: Scope) -> Self {
        let base_dir = base_dir.into();
        Self {
            class_dirs: vec![base_dir.join("target/classes")],
            source_dirs: vec![base_dir.join("src/main/java")],
            encoding: crate::utils::config::DEFAULT_SOURCE_ENCODING.to_string(),
            id,
            base_dir,
            scope,
        }
    }
}
