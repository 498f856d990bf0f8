//! HTML index page for the aggregate report.

use crate::report::analysis::{Counter, GroupCoverage, ModuleCoverage};
use crate::utils::config::REPORT_NAME;
use chrono::DateTime;

/// Render the analysed group as a single HTML page
///
/// **Public** - written as `index.html` by the format renderer
pub fn render(coverage: &GroupCoverage) -> String {
    let module_rows: String = coverage.modules.iter().map(module_row).collect();
    let module_sections: String = coverage.modules.iter().map(module_section).collect();

    let session_rows: String = coverage
        .sessions
        .iter()
        .map(|s| {
            format!(
                r#"
                <tr><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                html_escape(&s.id),
                format_millis(s.start),
                format_millis(s.dump)
            )
        })
        .collect();

    let sessions_html = if coverage.sessions.is_empty() {
        r#"
        <p class="empty">No sessions recorded.</p>"#
            .to_string()
    } else {
        format!(
            r#"
        <table>
            <thead><tr><th>Session</th><th>Start</th><th>Dump</th></tr></thead>
            <tbody>{session_rows}
            </tbody>
        </table>"#
        )
    };

    let title = html_escape(&coverage.title);
    let probes = coverage.probes();
    let classes = coverage.class_counter();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} - {REPORT_NAME}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            color: #1f2937;
            background: #f3f4f6;
            padding: 2rem;
        }}
        table {{
            border-collapse: collapse;
            width: 100%;
            margin-bottom: 1.5rem;
            background: white;
        }}
        th, td {{
            border: 1px solid #e5e7eb;
            padding: 0.4rem 0.8rem;
            text-align: left;
        }}
        .ctr {{ text-align: right; }}
        .empty {{ color: #6b7280; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p>Probes: {probe_cell} | Classes: {class_cell}</p>

    <h2>Modules</h2>
    <table>
        <thead><tr><th>Module</th><th>Probes</th><th>Classes</th></tr></thead>
        <tbody>{module_rows}
        </tbody>
    </table>
{module_sections}
    <h2>Sessions</h2>{sessions_html}
</body>
</html>
"#,
        probe_cell = counter_cell(probes),
        class_cell = counter_cell(classes),
    )
}

fn module_row(module: &ModuleCoverage) -> String {
    format!(
        r##"
            <tr><td><a href="#{}">{}</a></td><td class="ctr">{}</td><td class="ctr">{}</td></tr>"##,
        anchor(&module.name),
        html_escape(&module.name),
        counter_cell(module.probes()),
        counter_cell(module.class_counter())
    )
}

fn module_section(module: &ModuleCoverage) -> String {
    let body = if module.packages.is_empty() {
        r#"
    <p class="empty">No class files found.</p>"#
            .to_string()
    } else {
        let rows: String = module
            .packages
            .iter()
            .map(|p| {
                let name = if p.name.is_empty() {
                    "(default)".to_string()
                } else {
                    p.name.replace('/', ".")
                };
                format!(
                    r#"
            <tr><td>{}</td><td class="ctr">{}</td><td class="ctr">{}</td></tr>"#,
                    html_escape(&name),
                    counter_cell(p.probes()),
                    counter_cell(p.class_counter())
                )
            })
            .collect();
        format!(
            r#"
    <table>
        <thead><tr><th>Package</th><th>Probes</th><th>Classes</th></tr></thead>
        <tbody>{rows}
        </tbody>
    </table>"#
        )
    };

    format!(
        r#"
    <h2 id="{}">{}</h2>
    <p>Source encoding: {}</p>{}
"#,
        anchor(&module.name),
        html_escape(&module.name),
        html_escape(&module.encoding),
        body
    )
}

fn counter_cell(counter: Counter) -> String {
    format!(
        "{}/{} ({:.1}%)",
        counter.covered,
        counter.total(),
        counter.percentage()
    )
}

fn anchor(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
