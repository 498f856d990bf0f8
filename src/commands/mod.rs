//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod inspect;
pub mod report;
pub mod utils;

// Re-export main command functions
pub use inspect::{display_exec_info, display_modules, execute_find, execute_merge};
pub use report::{execute_report, validate_args, ReportArgs};
pub use utils::{display_version, validate_summary_file};
