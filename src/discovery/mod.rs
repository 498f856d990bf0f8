//! Discovery of execution data and class files.
//!
//! This module handles locating files below module directories using
//! include/exclude wildcard patterns.

pub mod filter;

// Re-export main types
pub use filter::{find_files, FileFilter};
