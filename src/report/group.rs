//! Report group tree handed to renderers.

use crate::discovery::FileFilter;
use crate::reactor::Module;
use std::path::PathBuf;

/// Class and source inputs of one module
#[derive(Debug, Clone)]
pub struct ModuleBundle {
    /// Group name, the module identifier
    pub name: String,
    pub class_dirs: Vec<PathBuf>,
    pub source_dirs: Vec<PathBuf>,
    pub encoding: String,

    /// Selects class files inside each class directory
    pub class_filter: FileFilter,
}

impl ModuleBundle {
    pub fn from_module(module: &Module, class_filter: &FileFilter) -> Self {
        Self {
            name: module.id.to_string(),
            class_dirs: module.class_dirs.clone(),
            source_dirs: module.source_dirs.clone(),
            encoding: module.encoding.clone(),
            class_filter: class_filter.clone(),
        }
    }
}

/// Root report group with one child per report module
#[derive(Debug, Clone)]
pub struct ReportGroup {
    pub title: String,
    pub children: Vec<ModuleBundle>,
}

impl ReportGroup {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
        }
    }

    /// Open a child group for `module`
    pub fn visit_module(&mut self, module: &Module, class_filter: &FileFilter) -> &ModuleBundle {
        self.children.push(ModuleBundle::from_module(module, class_filter));
        &self.children[self.children.len() - 1]
    }

    /// Child group names, in visit order
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }
}
