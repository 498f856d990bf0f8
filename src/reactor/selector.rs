//! Selection of modules contributing to the aggregate report.
//!
//! - `compile`, `runtime`, `provided`: classes, sources and execution data
//! - `test`: execution data only

use super::module::Module;
use log::info;

/// Modules rendered as report groups, in graph order
pub fn select_modules(all: &[Module]) -> Vec<&Module> {
    all.iter().filter(|m| m.scope.contributes_classes()).collect()
}

/// Modules whose execution data is loaded, in graph order
pub fn select_data_sources(all: &[Module]) -> Vec<&Module> {
    all.iter().collect()
}

/// Comma-joined `group:artifact:version` list for logging
pub fn describe_modules(modules: &[&Module]) -> String {
    modules
        .iter()
        .map(|m| m.id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Log the modules that will be added to the report
pub fn log_selection(report_modules: &[&Module], data_sources: &[&Module]) {
    info!("Projects to be added to report: {}", describe_modules(report_modules));
    info!("Projects providing execution data: {}", describe_modules(data_sources));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactor::module::{ModuleId, Scope};

    fn module(artifact: &str, scope: Scope) -> Module {
        Module::new(ModuleId::new("g", artifact, "1"), format!("/p/{}", artifact), scope)
    }

    fn graph() -> Vec<Module> {
        vec![
            module("api", Scope::Compile),
            module("it", Scope::Test),
            module("impl", Scope::Runtime),
            module("servlet", Scope::Provided),
        ]
    }

    #[test]
    fn test_select_modules_excludes_test_scope() {
        let all = graph();
        let names: Vec<_> = select_modules(&all)
            .iter()
            .map(|m| m.id.artifact.as_str())
            .collect();
        assert_eq!(names, vec!["api", "impl", "servlet"]);
    }

    #[test]
    fn test_select_data_sources_keeps_everything_in_order() {
        let all = graph();
        let names: Vec<_> = select_data_sources(&all)
            .iter()
            .map(|m| m.id.artifact.as_str())
            .collect();
        assert_eq!(names, vec!["api", "it", "impl", "servlet"]);
    }

    #[test]
    fn test_describe_modules() {
        let all = graph();
        let selected = select_modules(&all);
        assert_eq!(describe_modules(&selected[..2]), "g:api:1, g:impl:1");
    }
}
