//! CSV report: one row per class.

use crate::report::analysis::{ClassStatus, GroupCoverage};

const HEADER: &str = "GROUP,PACKAGE,CLASS,PROBE_MISSED,PROBE_COVERED,CLASS_STATUS";

/// Render the analysed group as CSV
pub fn render(coverage: &GroupCoverage) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');

    for module in &coverage.modules {
        let group = format!("{}/{}", coverage.title, module.name);
        for package in &module.packages {
            let package_name = package.name.replace('/', ".");
            for class in &package.classes {
                let row = [
                    escape(&group),
                    escape(&package_name),
                    escape(class.simple_name()),
                    class.probes.missed.to_string(),
                    class.probes.covered.to_string(),
                    status_label(class.status).to_string(),
                ];
                out.push_str(&row.join(","));
                out.push('\n');
            }
        }
    }

    out
}

fn status_label(status: ClassStatus) -> &'static str {
    match status {
        ClassStatus::Covered => "covered",
        ClassStatus::NotCovered => "not_covered",
        ClassStatus::NoData => "no_data",
        ClassStatus::Mismatch => "mismatch",
    }
}

fn escape(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
