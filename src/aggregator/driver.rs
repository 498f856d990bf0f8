//! Report driver: load every execution data file, then render once.
//!
//! Loading and rendering are separate types. `ReportDriver::load_all`
//! produces a `LoadedCoverage` holding the frozen accumulator, and
//! `LoadedCoverage::render` consumes it, so no data can be loaded after
//! rendering has started.

use crate::discovery::FileFilter;
use crate::exec::{Accumulator, ExecutionDataLoader, MergedCoverage};
use crate::reactor::Module;
use crate::report::{ReportGroup, ReportRenderer};
use crate::utils::error::{AggregateError, ExecDataError};
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Loads execution data of one run through a loading collaborator
pub struct ReportDriver<'a> {
    loader: &'a dyn ExecutionDataLoader,
    data_filter: &'a FileFilter,
}

impl<'a> ReportDriver<'a> {
    pub fn new(loader: &'a dyn ExecutionDataLoader, data_filter: &'a FileFilter) -> Self {
        Self {
            loader,
            data_filter,
        }
    }

    /// Load execution data of the root module and every data source
    ///
    /// **Public** - loading phase of a run
    ///
    /// The root's base directory is searched first, then each data source in
    /// the given order. A file reached twice is loaded once.
    ///
    /// # Errors
    /// * `AggregateError::Discovery` - a base directory cannot be scanned
    /// * `AggregateError::Load` - a located file cannot be opened or decoded
    pub fn load_all(
        &self,
        root: &Module,
        data_sources: &[&Module],
    ) -> Result<LoadedCoverage, AggregateError> {
        let mut accumulator = Accumulator::new();

        self.load_base_dir(&root.base_dir, &mut accumulator)?;
        for module in data_sources {
            self.load_base_dir(&module.base_dir, &mut accumulator)?;
        }

        info!("Loaded {} execution data file(s)", accumulator.file_count());

        Ok(LoadedCoverage {
            coverage: accumulator.freeze(),
        })
    }

    fn load_base_dir(&self, base_dir: &Path, accumulator: &mut Accumulator) -> Result<(), AggregateError> {
        let files = self.data_filter.find_files(base_dir)?;
        info!(
            "Found execution data files in {}: {:?}",
            base_dir.display(),
            files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>()
        );

        for file in files {
            let canonical = std::fs::canonicalize(&file).unwrap_or_else(|_| file.clone());
            if accumulator.contains_file(&canonical) {
                debug!("Already loaded: {}", canonical.display());
                continue;
            }
            self.load_file(&canonical, accumulator)?;
        }
        Ok(())
    }

    fn load_file(&self, path: &Path, accumulator: &mut Accumulator) -> Result<(), AggregateError> {
        info!("Loading execution data file {}", path.display());

        let load_error = |source: ExecDataError| AggregateError::Load {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(|e| load_error(ExecDataError::Io(e)))?;
        let mut reader = BufReader::new(file);

        self.loader
            .load(&mut reader, accumulator)
            .map_err(load_error)?;
        accumulator.record_file(path);

        Ok(())
    }
}

/// Merged, read-only coverage ready to be rendered
#[derive(Debug)]
pub struct LoadedCoverage {
    coverage: MergedCoverage,
}

impl LoadedCoverage {
    pub fn coverage(&self) -> &MergedCoverage {
        &self.coverage
    }

    /// Render one grouped report and finish the run
    ///
    /// **Public** - rendering phase of a run
    ///
    /// # Arguments
    /// * `renderer` - rendering collaborator
    /// * `title` - title of the root group
    /// * `report_modules` - one child group each, in the given order
    /// * `class_filter` - class file selection for every child
    ///
    /// # Errors
    /// * `AggregateError::Render` - the renderer failed
    pub fn render(
        self,
        renderer: &mut dyn ReportRenderer,
        title: &str,
        report_modules: &[&Module],
        class_filter: &FileFilter,
    ) -> Result<RunSummary, AggregateError> {
        let mut group = ReportGroup::new(title);
        for module in report_modules {
            let bundle = group.visit_module(module, class_filter);
            debug!("Added group {} ({} class dir(s))", bundle.name, bundle.class_dirs.len());
        }

        renderer.render(&group, &self.coverage)?;

        let (probes, covered_probes) = self.coverage.probe_totals();
        Ok(RunSummary {
            title: group.title.clone(),
            groups: group.child_names().iter().map(|n| n.to_string()).collect(),
            exec_files: self.coverage.files().to_vec(),
            classes: self.coverage.execution_data().len(),
            sessions: self.coverage.sessions().len(),
            probes,
            covered_probes,
        })
    }
}

/// What a completed run merged and rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub title: String,

    /// Child group names, in render order
    pub groups: Vec<String>,

    /// Execution data files, in load order
    pub exec_files: Vec<PathBuf>,

    /// Classes with execution data
    pub classes: usize,
    pub sessions: usize,
    pub probes: usize,
    pub covered_probes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecFileLoader, ExecutionData, ExecutionDataWriter, SessionInfo};
    use crate::reactor::{ModuleId, Scope};
    use crate::utils::error::RenderError;
    use std::fs;

    fn write_exec(path: &Path, classes: &[ExecutionData]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut writer = ExecutionDataWriter::new(File::create(path).unwrap()).unwrap();
        writer.write_session(&SessionInfo::new("s", 0, 1)).unwrap();
        for class in classes {
            writer.write_class(class).unwrap();
        }
        writer.into_inner().unwrap();
    }

    fn module(root: &Path, artifact: &str, scope: Scope) -> Module {
        Module::new(ModuleId::new("g", artifact, "1"), root.join(artifact), scope)
    }

    fn data_filter() -> FileFilter {
        FileFilter::for_data_files(&[], &[]).unwrap()
    }

    #[derive(Default)]
    struct RecordingRenderer {
        groups: Vec<String>,
        classes: usize,
    }

    impl ReportRenderer for RecordingRenderer {
        fn render(&mut self, group: &ReportGroup, coverage: &MergedCoverage) -> Result<(), RenderError> {
            self.groups = group.child_names().iter().map(|n| n.to_string()).collect();
            self.classes = coverage.execution_data().len();
            Ok(())
        }
    }

    struct FailingRenderer;

    impl ReportRenderer for FailingRenderer {
        fn render(&mut self, _: &ReportGroup, _: &MergedCoverage) -> Result<(), RenderError> {
            Err(RenderError::Scan("boom".to_string()))
        }
    }

    #[test]
    fn test_root_loaded_before_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = module(dir.path(), "root", Scope::Compile);
        let core = module(dir.path(), "core", Scope::Compile);
        write_exec(&root.base_dir.join("target/jacoco.exec"), &[]);
        write_exec(&core.base_dir.join("target/jacoco.exec"), &[]);

        let filter = data_filter();
        let loaded = ReportDriver::new(&ExecFileLoader, &filter)
            .load_all(&root, &[&core])
            .unwrap();

        let files = loaded.coverage().files();
        assert_eq!(files.len(), 2);
        assert!(files[0].starts_with(fs::canonicalize(&root.base_dir).unwrap()));
    }

    #[test]
    fn test_same_file_loaded_once() {
        let dir = tempfile::tempdir().unwrap();
        let root = module(dir.path(), "root", Scope::Compile);
        write_exec(
            &root.base_dir.join("target/jacoco.exec"),
            &[ExecutionData::new(1, "a/A", vec![true])],
        );

        let filter = data_filter();
        let loaded = ReportDriver::new(&ExecFileLoader, &filter)
            .load_all(&root, &[&root])
            .unwrap();

        assert_eq!(loaded.coverage().files().len(), 1);
        assert_eq!(loaded.coverage().sessions().len(), 1);
    }

    #[test]
    fn test_corrupt_file_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let root = module(dir.path(), "root", Scope::Compile);
        fs::create_dir_all(root.base_dir.join("target")).unwrap();
        fs::write(root.base_dir.join("target/bad.exec"), b"garbage").unwrap();

        let filter = data_filter();
        let result = ReportDriver::new(&ExecFileLoader, &filter).load_all(&root, &[]);

        match result {
            Err(AggregateError::Load { path, .. }) => assert!(path.ends_with("bad.exec")),
            other => panic!("expected load error, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_exec_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let root = module(dir.path(), "root", Scope::Compile);
        write_exec(
            &dir.path().join("shared/it.exec"),
            &[ExecutionData::new(7, "a/Linked", vec![true])],
        );
        fs::create_dir_all(root.base_dir.join("target")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("shared/it.exec"), root.base_dir.join("target/it.exec"))
            .unwrap();

        let filter = data_filter();
        let loaded = ReportDriver::new(&ExecFileLoader, &filter)
            .load_all(&root, &[])
            .unwrap();

        assert_eq!(loaded.coverage().files().len(), 1);
        assert!(loaded.coverage().execution_data().get(7).is_some());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_tree_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let root = module(dir.path(), "root", Scope::Compile);
        write_exec(&root.base_dir.join("target/jacoco.exec"), &[]);
        std::os::unix::fs::symlink(root.base_dir.join("target"), root.base_dir.join("target/loop"))
            .unwrap();

        let filter = data_filter();
        let result = ReportDriver::new(&ExecFileLoader, &filter).load_all(&root, &[]);

        assert!(matches!(result, Err(AggregateError::Discovery(_))));
    }

    #[test]
    fn test_render_visits_every_module() {
        let dir = tempfile::tempdir().unwrap();
        let root = module(dir.path(), "root", Scope::Compile);
        let api = module(dir.path(), "api", Scope::Compile);
        let web = module(dir.path(), "web", Scope::Provided);

        let filter = data_filter();
        let loaded = ReportDriver::new(&ExecFileLoader, &filter)
            .load_all(&root, &[])
            .unwrap();

        let mut renderer = RecordingRenderer::default();
        let summary = loaded
            .render(&mut renderer, "All", &[&api, &web], &filter)
            .unwrap();

        assert_eq!(renderer.groups, vec!["g:api:1", "g:web:1"]);
        assert_eq!(summary.groups, renderer.groups);
        assert_eq!(summary.title, "All");
        assert_eq!(summary.classes, 0);
    }

    #[test]
    fn test_render_failure_surfaces() {
        let dir = tempfile::tempdir().unwrap();
        let root = module(dir.path(), "root", Scope::Compile);
        let filter = data_filter();
        let loaded = ReportDriver::new(&ExecFileLoader, &filter)
            .load_all(&root, &[])
            .unwrap();

        let result = loaded.render(&mut FailingRenderer, "All", &[&root], &filter);
        assert!(matches!(result, Err(AggregateError::Render(RenderError::Scan(_)))));
    }
}
