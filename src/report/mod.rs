//! Report model and rendering.
//!
//! This module handles:
//! - The report group tree (one child per module)
//! - Joining class directories against merged coverage
//! - The renderer interface and its default implementation

pub mod analysis;
pub mod group;
pub mod renderer;

// Re-export main types
pub use analysis::{analyze_group, ClassCoverage, ClassStatus, Counter, GroupCoverage, ModuleCoverage};
pub use group::{ModuleBundle, ReportGroup};
pub use renderer::{FormatRenderer, ReportRenderer};
