//! Join class directories against merged execution data.
//!
//! Class files are matched to execution data by class id (CRC-64 of the
//! class bytes). Without bytecode analysis the probe count of a class that
//! never ran is unknown, so such classes only count as missed classes.

use super::group::{ModuleBundle, ReportGroup};
use crate::exec::{crc64, MergedCoverage, SessionInfo};
use crate::utils::config::SOURCE_EXTENSIONS;
use crate::utils::error::RenderError;
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Missed/covered pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counter {
    pub missed: usize,
    pub covered: usize,
}

impl Counter {
    pub fn new(missed: usize, covered: usize) -> Self {
        Self { missed, covered }
    }

    pub fn total(&self) -> usize {
        self.missed + self.covered
    }

    /// Covered ratio in percent, 0 when empty
    pub fn percentage(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            (self.covered as f64 / self.total() as f64) * 100.0
        }
    }

    pub fn add(self, other: Counter) -> Counter {
        Counter::new(self.missed + other.missed, self.covered + other.covered)
    }
}

/// How a class file relates to the execution data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    /// Execution data found and at least one probe hit
    Covered,
    /// Execution data found but no probe hit
    NotCovered,
    /// No execution data for this class
    NoData,
    /// Execution data exists for the name but from a different class file
    Mismatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassCoverage {
    /// VM name, e.g. `com/example/Foo`
    pub name: String,
    pub id: u64,
    pub status: ClassStatus,
    pub probes: Counter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
}

impl ClassCoverage {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    pub fn class_counter(&self) -> Counter {
        if self.status == ClassStatus::Covered {
            Counter::new(0, 1)
        } else {
            Counter::new(1, 0)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageCoverage {
    /// VM package name, empty for the default package
    pub name: String,
    pub classes: Vec<ClassCoverage>,
}

impl PackageCoverage {
    pub fn probes(&self) -> Counter {
        self.classes
            .iter()
            .fold(Counter::default(), |acc, c| acc.add(c.probes))
    }

    pub fn class_counter(&self) -> Counter {
        self.classes
            .iter()
            .fold(Counter::default(), |acc, c| acc.add(c.class_counter()))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleCoverage {
    pub name: String,
    pub encoding: String,
    pub packages: Vec<PackageCoverage>,
    pub source_roots: Vec<PathBuf>,
}

impl ModuleCoverage {
    pub fn probes(&self) -> Counter {
        self.packages
            .iter()
            .fold(Counter::default(), |acc, p| acc.add(p.probes()))
    }

    pub fn class_counter(&self) -> Counter {
        self.packages
            .iter()
            .fold(Counter::default(), |acc, p| acc.add(p.class_counter()))
    }
}

/// Analysed report group, input for every output writer
#[derive(Debug, Clone, Serialize)]
pub struct GroupCoverage {
    pub title: String,
    pub modules: Vec<ModuleCoverage>,
    pub sessions: Vec<SessionInfo>,
    pub exec_files: Vec<PathBuf>,
}

impl GroupCoverage {
    pub fn probes(&self) -> Counter {
        self.modules
            .iter()
            .fold(Counter::default(), |acc, m| acc.add(m.probes()))
    }

    pub fn class_counter(&self) -> Counter {
        self.modules
            .iter()
            .fold(Counter::default(), |acc, m| acc.add(m.class_counter()))
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        let probes = self.probes();
        let classes = self.class_counter();
        format!(
            "Modules: {} | Classes: {}/{} | Probes: {}/{} ({:.1}%)",
            self.modules.len(),
            classes.covered,
            classes.total(),
            probes.covered,
            probes.total(),
            probes.percentage()
        )
    }
}

/// Analyse every child of `group`
///
/// **Public** - main entry point for renderers
///
/// # Errors
/// * `RenderError::Scan` - a class file cannot be read
pub fn analyze_group(
    group: &ReportGroup,
    coverage: &MergedCoverage,
) -> Result<GroupCoverage, RenderError> {
    let modules = group
        .children
        .iter()
        .map(|bundle| analyze_bundle(bundle, coverage))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GroupCoverage {
        title: group.title.clone(),
        modules,
        sessions: coverage.sessions().to_vec(),
        exec_files: coverage.files().to_vec(),
    })
}

/// Analyse one module's class directories
pub fn analyze_bundle(
    bundle: &ModuleBundle,
    coverage: &MergedCoverage,
) -> Result<ModuleCoverage, RenderError> {
    debug!("Analyzing module {}", bundle.name);

    let mut packages: BTreeMap<String, Vec<ClassCoverage>> = BTreeMap::new();
    let mut seen: HashSet<String> = HashSet::new();

    for class_dir in &bundle.class_dirs {
        let entries = bundle
            .class_filter
            .find_entries(class_dir)
            .map_err(|e| RenderError::Scan(e.to_string()))?;

        for (relative, path) in entries {
            let Some(name) = relative.strip_suffix(".class") else {
                continue;
            };
            if name.ends_with("module-info") || name.ends_with("package-info") {
                continue;
            }
            if !seen.insert(name.to_string()) {
                debug!("Duplicate class {} in {}, keeping first", name, class_dir.display());
                continue;
            }

            let class = analyze_class(name, &path, coverage, &bundle.source_dirs)?;
            let package = name.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
            packages.entry(package.to_string()).or_default().push(class);
        }
    }

    let packages = packages
        .into_iter()
        .map(|(name, mut classes)| {
            classes.sort_by(|a, b| a.name.cmp(&b.name));
            PackageCoverage { name, classes }
        })
        .collect();

    Ok(ModuleCoverage {
        name: bundle.name.clone(),
        encoding: bundle.encoding.clone(),
        packages,
        source_roots: bundle
            .source_dirs
            .iter()
            .filter(|d| d.is_dir())
            .cloned()
            .collect(),
    })
}

fn analyze_class(
    name: &str,
    path: &Path,
    coverage: &MergedCoverage,
    source_dirs: &[PathBuf],
) -> Result<ClassCoverage, RenderError> {
    let bytes = std::fs::read(path)
        .map_err(|e| RenderError::Scan(format!("{}: {}", path.display(), e)))?;
    let id = crc64::class_id(&bytes);
    let store = coverage.execution_data();

    let (status, probes) = match store.get(id) {
        Some(data) => {
            let covered = data.covered_probes();
            let status = if data.has_hits() {
                ClassStatus::Covered
            } else {
                ClassStatus::NotCovered
            };
            (status, Counter::new(data.probes.len() - covered, covered))
        }
        None if store.find_by_name(name).is_some() => {
            warn!("Execution data for class {} does not match its class file", name);
            (ClassStatus::Mismatch, Counter::default())
        }
        None => (ClassStatus::NoData, Counter::default()),
    };

    Ok(ClassCoverage {
        name: name.to_string(),
        id,
        status,
        probes,
        source_file: find_source_file(name, source_dirs),
    })
}

/// Locate the source file of a class, returning its file name
fn find_source_file(class_name: &str, source_dirs: &[PathBuf]) -> Option<String> {
    let outer = class_name.split('$').next().unwrap_or(class_name);

    source_dirs.iter().find_map(|dir| {
        SOURCE_EXTENSIONS.iter().find_map(|ext| {
            let candidate = dir.join(format!("{}.{}", outer, ext));
            candidate
                .is_file()
                .then(|| candidate.file_name().map(|n| n.to_string_lossy().into_owned()))
                .flatten()
        })
    })
}
