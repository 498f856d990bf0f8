//! In-memory stores for execution data and the per-run accumulator.
//!
//! The `Accumulator` is the only mutable coverage state of a run. Once
//! loading finishes it is frozen into `MergedCoverage`, which exposes no
//! mutating methods.

use crate::utils::error::ExecDataError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Probe data recorded for one class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionData {
    /// CRC-64 of the class file bytes
    pub id: u64,

    /// VM class name, e.g. `com/example/Foo`
    pub name: String,

    /// One flag per probe, true when executed
    pub probes: Vec<bool>,
}

impl ExecutionData {
    pub fn new(id: u64, name: impl Into<String>, probes: Vec<bool>) -> Self {
        Self {
            id,
            name: name.into(),
            probes,
        }
    }

    /// Number of executed probes
    pub fn covered_probes(&self) -> usize {
        self.probes.iter().filter(|p| **p).count()
    }

    /// True when at least one probe was executed
    pub fn has_hits(&self) -> bool {
        self.probes.iter().any(|p| *p)
    }

    /// OR-merge another record for the same class into this one
    ///
    /// # Errors
    /// * `ExecDataError::ClassNameConflict` - same id, different class name
    /// * `ExecDataError::ProbeCountConflict` - same id, different probe count
    pub fn merge(&mut self, other: &ExecutionData) -> Result<(), ExecDataError> {
        self.check_compatible(other)?;
        for (mine, theirs) in self.probes.iter_mut().zip(&other.probes) {
            *mine |= *theirs;
        }
        Ok(())
    }

    fn check_compatible(&self, other: &ExecutionData) -> Result<(), ExecDataError> {
        if self.name != other.name {
            return Err(ExecDataError::ClassNameConflict {
                id: self.id,
                existing: self.name.clone(),
                incoming: other.name.clone(),
            });
        }
        if self.probes.len() != other.probes.len() {
            return Err(ExecDataError::ProbeCountConflict {
                id: self.id,
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// A recorded test session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: String,

    /// Session start, epoch milliseconds
    pub start: i64,

    /// Time of the dump, epoch milliseconds
    pub dump: i64,
}

impl SessionInfo {
    pub fn new(id: impl Into<String>, start: i64, dump: i64) -> Self {
        Self {
            id: id.into(),
            start,
            dump,
        }
    }
}

/// Execution data keyed by class id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionDataStore {
    entries: BTreeMap<u64, ExecutionData>,
    /// Class name to the lowest class id recorded under it
    names: BTreeMap<String, u64>,
}

impl ExecutionDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or merge a class record
    pub fn put(&mut self, data: ExecutionData) -> Result<(), ExecDataError> {
        match self.entries.get_mut(&data.id) {
            Some(existing) => existing.merge(&data),
            None => {
                self.names
                    .entry(data.name.clone())
                    .and_modify(|id| *id = (*id).min(data.id))
                    .or_insert(data.id);
                self.entries.insert(data.id, data);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<&ExecutionData> {
        self.entries.get(&id)
    }

    /// Look up a record by class name
    pub fn find_by_name(&self, name: &str) -> Option<&ExecutionData> {
        self.names.get(name).and_then(|id| self.entries.get(id))
    }

    /// Records ordered by class id
    pub fn contents(&self) -> impl Iterator<Item = &ExecutionData> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collected session infos
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfoStore {
    infos: Vec<SessionInfo>,
}

impl SessionInfoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, info: SessionInfo) {
        self.infos.push(info);
    }

    /// Sessions sorted by dump time, then id
    pub fn infos(&self) -> Vec<SessionInfo> {
        let mut sorted = self.infos.clone();
        sorted.sort_by(|a, b| a.dump.cmp(&b.dump).then_with(|| a.id.cmp(&b.id)));
        sorted
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}

/// Merge target for all execution data loaded in one run
///
/// **Public** - owned by the report driver while loading
#[derive(Debug, Default)]
pub struct Accumulator {
    data: ExecutionDataStore,
    sessions: SessionInfoStore,
    files: Vec<PathBuf>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visit_class(&mut self, data: ExecutionData) -> Result<(), ExecDataError> {
        self.data.put(data)
    }

    pub fn visit_session(&mut self, info: SessionInfo) {
        self.sessions.put(info);
    }

    /// Record that a file has been fully loaded
    pub fn record_file(&mut self, path: &Path) {
        self.files.push(path.to_path_buf());
    }

    /// Whether `path` was already loaded in this run
    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Stop accepting data; the result is read-only
    pub fn freeze(self) -> MergedCoverage {
        MergedCoverage {
            data: self.data,
            sessions: self.sessions.infos(),
            files: self.files,
        }
    }
}

/// Read-only, fully merged coverage of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedCoverage {
    data: ExecutionDataStore,
    sessions: Vec<SessionInfo>,
    files: Vec<PathBuf>,
}

impl MergedCoverage {
    pub fn execution_data(&self) -> &ExecutionDataStore {
        &self.data
    }

    pub fn sessions(&self) -> &[SessionInfo] {
        &self.sessions
    }

    /// Files loaded, in load order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Total and covered probe counts over all classes
    pub fn probe_totals(&self) -> (usize, usize) {
        self.data.contents().fold((0, 0), |(total, covered), d| {
            (total + d.probes.len(), covered + d.covered_probes())
        })
    }
}
