//! Decide whether aggregation runs now or is deferred.
//!
//! In a multi-module build the aggregate can only be produced once every
//! module has written its execution data, which is when the current module
//! is the root of the build.

use crate::reactor::Module;
use crate::utils::config::AggregateSettings;
use log::info;

/// Check whether the aggregate report should be generated for `current`
///
/// **Public** - first step of every run
///
/// # Arguments
/// * `current` - the module executing the aggregation
/// * `is_execution_root` - whether `current` is the root of the build graph
/// * `settings` - validated settings carrying the reporting preconditions
///
/// # Returns
/// True when the run may proceed to loading
pub fn can_run(current: &Module, is_execution_root: bool, settings: &AggregateSettings) -> bool {
    if !is_execution_root {
        info!("Delaying report generation to the end of multi-module project");
        return false;
    }

    match settings.can_generate_report() {
        Ok(()) => true,
        Err(reason) => {
            info!("Skipping aggregate report for {}: {}", current.id, reason);
            false
        }
    }
}
