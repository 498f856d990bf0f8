//! XML report writer.
//!
//! Layout: `report > sessioninfo*, group* > package* > class*`, every
//! element above `class` closing with its aggregated `counter` elements.

use crate::report::analysis::{ClassStatus, Counter, GroupCoverage};
use crate::utils::error::RenderError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.writer
            .write_event(event)
            .map_err(|e| RenderError::Xml(e.to_string()))
    }

    fn element<'a>(name: &'a str, attributes: &[(&'a str, &'a str)]) -> BytesStart<'a> {
        let mut element = BytesStart::new(name);
        for attribute in attributes {
            element.push_attribute(*attribute);
        }
        element
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), RenderError> {
        self.event(Event::Start(Self::element(name, attributes)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), RenderError> {
        self.event(Event::Empty(Self::element(name, attributes)))
    }

    fn end(&mut self, name: &str) -> Result<(), RenderError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn counters(&mut self, probes: Counter, classes: Counter) -> Result<(), RenderError> {
        self.counter("PROBE", probes)?;
        self.counter("CLASS", classes)
    }

    fn counter(&mut self, kind: &str, counter: Counter) -> Result<(), RenderError> {
        let missed = counter.missed.to_string();
        let covered = counter.covered.to_string();
        self.empty(
            "counter",
            &[("type", kind), ("missed", missed.as_str()), ("covered", covered.as_str())],
        )
    }

    fn finish(self) -> Result<String, RenderError> {
        String::from_utf8(self.writer.into_inner()).map_err(|e| RenderError::Xml(e.to_string()))
    }
}

fn status_attr(status: ClassStatus) -> &'static str {
    match status {
        ClassStatus::Covered => "covered",
        ClassStatus::NotCovered => "not_covered",
        ClassStatus::NoData => "no_data",
        ClassStatus::Mismatch => "mismatch",
    }
}

/// Render the analysed group as an XML document
///
/// # Errors
/// * `RenderError::Xml` - the XML writer failed
pub fn render(coverage: &GroupCoverage) -> Result<String, RenderError> {
    let mut out = XmlOut::new();

    out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    out.start("report", &[("name", coverage.title.as_str())])?;

    for session in &coverage.sessions {
        let start = session.start.to_string();
        let dump = session.dump.to_string();
        out.empty(
            "sessioninfo",
            &[
                ("id", session.id.as_str()),
                ("start", start.as_str()),
                ("dump", dump.as_str()),
            ],
        )?;
    }

    for module in &coverage.modules {
        out.start("group", &[("name", module.name.as_str())])?;

        for package in &module.packages {
            out.start("package", &[("name", package.name.as_str())])?;

            for class in &package.classes {
                let mut attributes = vec![("name", class.name.as_str())];
                if let Some(source) = &class.source_file {
                    attributes.push(("sourcefilename", source.as_str()));
                }
                attributes.push(("status", status_attr(class.status)));

                out.start("class", &attributes)?;
                out.counters(class.probes, class.class_counter())?;
                out.end("class")?;
            }

            out.counters(package.probes(), package.class_counter())?;
            out.end("package")?;
        }

        out.counters(module.probes(), module.class_counter())?;
        out.end("group")?;
    }

    out.counters(coverage.probes(), coverage.class_counter())?;
    out.end("report")?;

    out.finish()
}
