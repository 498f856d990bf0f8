//! Build graph model and module selection.
//!
//! This module handles:
//! - Module identity, scope and directory layout
//! - Loading the build graph from a reactor manifest
//! - Choosing which modules contribute classes vs. execution data only

pub mod manifest;
pub mod module;
pub mod selector;

// Re-export main types
pub use manifest::BuildGraph;
pub use module::{Module, ModuleId, Scope};
pub use selector::{describe_modules, log_selection, select_data_sources, select_modules};
