//! Reactor manifest loading.
//!
//! The build graph is described by a TOML or JSON file:
//!
//! ```toml
//! execution_root = true
//!
//! [root]
//! group = "org.example"
//! artifact = "parent"
//! version = "1.0.0"
//! base_dir = "."
//!
//! [[modules]]
//! group = "org.example"
//! artifact = "core"
//! version = "1.0.0"
//! base_dir = "core"
//! scope = "compile"
//! ```
//!
//! Relative `base_dir` values resolve against the manifest's directory;
//! relative class and source directories resolve against the module's base.

use super::module::{Module, ModuleId, Scope};
use crate::utils::error::ReactorError;
use log::debug;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default = "default_execution_root")]
    execution_root: bool,
    root: RawModule,
    #[serde(default)]
    modules: Vec<RawModule>,
}

fn default_execution_root() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawModule {
    group: String,
    artifact: String,
    version: String,
    #[serde(default)]
    base_dir: Option<PathBuf>,
    #[serde(default)]
    scope: Scope,
    #[serde(default)]
    class_dirs: Option<Vec<PathBuf>>,
    #[serde(default)]
    source_dirs: Option<Vec<PathBuf>>,
    #[serde(default)]
    encoding: Option<String>,
}

impl RawModule {
    fn resolve(self, manifest_dir: &Path, default_encoding: &str) -> Result<Module, ReactorError> {
        if self.artifact.trim().is_empty() {
            return Err(ReactorError::InvalidModule(format!(
                "module in group '{}' has an empty artifact id",
                self.group
            )));
        }

        let base_dir = match self.base_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => manifest_dir.join(dir),
            None => manifest_dir.join(&self.artifact),
        };

        let id = ModuleId::new(self.group, self.artifact, self.version);
        let mut module = Module::new(id, base_dir, self.scope);

        if let Some(dirs) = self.class_dirs {
            module.class_dirs = dirs.into_iter().map(|d| module.base_dir.join(d)).collect();
        }
        if let Some(dirs) = self.source_dirs {
            module.source_dirs = dirs.into_iter().map(|d| module.base_dir.join(d)).collect();
        }
        module.encoding = self.encoding.unwrap_or_else(|| default_encoding.to_string());

        Ok(module)
    }
}

/// Snapshot of the build graph for one aggregation run
#[derive(Debug, Clone)]
pub struct BuildGraph {
    /// Whether the current module is the root of the build
    pub execution_root: bool,

    /// The aggregating module
    pub root: Module,

    /// Sibling modules, in reactor order
    pub modules: Vec<Module>,
}

impl BuildGraph {
    /// Build a graph from already-resolved modules
    ///
    /// # Errors
    /// * `ReactorError::DuplicateModule` - two modules, the root included,
    ///   share an identifier
    pub fn new(root: Module, modules: Vec<Module>, execution_root: bool) -> Result<Self, ReactorError> {
        let mut seen = HashSet::new();
        seen.insert(&root.id);
        for module in &modules {
            if !seen.insert(&module.id) {
                return Err(ReactorError::DuplicateModule(module.id.to_string()));
            }
        }

        Ok(Self {
            execution_root,
            root,
            modules,
        })
    }

    /// Load a manifest; the format follows the file extension (`.json` or TOML)
    ///
    /// **Public** - main entry point for the build graph collaborator
    ///
    /// # Arguments
    /// * `path` - manifest file
    /// * `default_encoding` - encoding for modules that do not declare one
    pub fn from_file(path: impl AsRef<Path>, default_encoding: &str) -> Result<Self, ReactorError> {
        let path = path.as_ref();
        debug!("Reading reactor manifest from: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|source| ReactorError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let raw: RawManifest = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        let manifest_dir = absolute_parent(path);
        Self::from_raw(raw, &manifest_dir, default_encoding)
    }

    /// Parse a TOML manifest, resolving paths against `manifest_dir`
    pub fn from_toml_str(
        content: &str,
        manifest_dir: &Path,
        default_encoding: &str,
    ) -> Result<Self, ReactorError> {
        let raw: RawManifest = toml::from_str(content)?;
        Self::from_raw(raw, manifest_dir, default_encoding)
    }

    fn from_raw(
        raw: RawManifest,
        manifest_dir: &Path,
        default_encoding: &str,
    ) -> Result<Self, ReactorError> {
        let mut root = raw.root;
        if root.base_dir.is_none() {
            root.base_dir = Some(manifest_dir.to_path_buf());
        }
        let root = root.resolve(manifest_dir, default_encoding)?;

        let modules = raw
            .modules
            .into_iter()
            .map(|m| m.resolve(manifest_dir, default_encoding))
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Reactor contains {} module(s) besides the root", modules.len());

        Self::new(root, modules, raw.execution_root)
    }
}

fn absolute_parent(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if parent.is_absolute() {
        return parent.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(parent))
        .unwrap_or_else(|_| parent.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[root]
group = "org.example"
artifact = "parent"
version = "1.0.0"

[[modules]]
group = "org.example"
artifact = "core"
version = "1.0.0"
scope = "compile"
class_dirs = ["build/classes"]

[[modules]]
group = "org.example"
artifact = "it"
version = "1.0.0"
base_dir = "integration-tests"
scope = "test"
encoding = "ISO-8859-1"
"#;

    #[test]
    fn test_parse_manifest() {
        let graph = BuildGraph::from_toml_str(MANIFEST, Path::new("/proj"), "UTF-8").unwrap();

        assert!(graph.execution_root);
        assert_eq!(graph.root.base_dir, PathBuf::from("/proj"));
        assert_eq!(graph.modules.len(), 2);

        let core = &graph.modules[0];
        assert_eq!(core.base_dir, PathBuf::from("/proj/core"));
        assert_eq!(core.class_dirs, vec![PathBuf::from("/proj/core/build/classes")]);
        assert_eq!(core.encoding, "UTF-8");

        let it = &graph.modules[1];
        assert_eq!(it.scope, Scope::Test);
        assert_eq!(it.base_dir, PathBuf::from("/proj/integration-tests"));
        assert_eq!(it.encoding, "ISO-8859-1");
    }

    #[test]
    fn test_duplicate_modules_rejected() {
        let manifest = r#"
[root]
group = "g"
artifact = "root"
version = "1"

[[modules]]
group = "g"
artifact = "a"
version = "1"

[[modules]]
group = "g"
artifact = "a"
version = "1"
"#;
        let result = BuildGraph::from_toml_str(manifest, Path::new("/p"), "UTF-8");
        assert!(matches!(result, Err(ReactorError::DuplicateModule(_))));
    }

    #[test]
    fn test_module_repeating_root_rejected() {
        let manifest = r#"
[root]
group = "g"
artifact = "root"
version = "1"

[[modules]]
group = "g"
artifact = "a"
version = "1"

[[modules]]
group = "g"
artifact = "root"
version = "1"
"#;
        let result = BuildGraph::from_toml_str(manifest, Path::new("/p"), "UTF-8");
        match result {
            Err(ReactorError::DuplicateModule(id)) => assert_eq!(id, "g:root:1"),
            other => panic!("expected duplicate module, got {:?}", other.map(|g| g.modules.len())),
        }
    }

    #[test]
    fn test_unknown_scope_rejected() {
        let manifest = r#"
[root]
group = "g"
artifact = "root"
version = "1"

[[modules]]
group = "g"
artifact = "a"
version = "1"
scope = "system"
"#;
        assert!(BuildGraph::from_toml_str(manifest, Path::new("/p"), "UTF-8").is_err());
    }

    #[test]
    fn test_json_manifest_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reactor.json");
        std::fs::write(
            &path,
            r#"{
                "execution_root": false,
                "root": {"group": "g", "artifact": "root", "version": "1"},
                "modules": [{"group": "g", "artifact": "a", "version": "1", "scope": "runtime"}]
            }"#,
        )
        .unwrap();

        let graph = BuildGraph::from_file(&path, "UTF-8").unwrap();
        assert!(!graph.execution_root);
        assert_eq!(graph.modules[0].scope, Scope::Runtime);
        assert_eq!(graph.modules[0].base_dir, dir.path().join("a"));
    }
}
