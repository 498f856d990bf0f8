//! Rendering collaborator interface and the default multi-format renderer.

use super::analysis::{analyze_group, GroupCoverage};
use super::group::ReportGroup;
use crate::exec::MergedCoverage;
use crate::output::{csv, html, json, write_report_file, xml};
use crate::utils::config::ReportFormat;
use crate::utils::error::RenderError;
use log::info;
use std::path::{Path, PathBuf};

/// Renders a grouped report from merged coverage
///
/// Implementations receive the complete group tree once, after all
/// execution data has been merged.
pub trait ReportRenderer {
    fn render(&mut self, group: &ReportGroup, coverage: &MergedCoverage) -> Result<(), RenderError>;
}

/// Writes HTML, XML, CSV and JSON reports into one directory
///
/// **Public** - default renderer used by the `report` command
#[derive(Debug)]
pub struct FormatRenderer {
    output_dir: PathBuf,
    formats: Vec<ReportFormat>,
    written: Vec<PathBuf>,
    analysis: Option<GroupCoverage>,
}

impl FormatRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, formats: Vec<ReportFormat>) -> Self {
        Self {
            output_dir: output_dir.into(),
            formats,
            written: Vec::new(),
            analysis: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Files written by the last render
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Analysis produced by the last render
    pub fn analysis(&self) -> Option<&GroupCoverage> {
        self.analysis.as_ref()
    }
}

impl ReportRenderer for FormatRenderer {
    fn render(&mut self, group: &ReportGroup, coverage: &MergedCoverage) -> Result<(), RenderError> {
        let analysis = analyze_group(group, coverage)?;
        info!("Coverage: {}", analysis.summary());

        self.written.clear();
        for format in &self.formats {
            let path = self.output_dir.join(format.file_name());
            match format {
                ReportFormat::Html => write_report_file(&html::render(&analysis), &path)?,
                ReportFormat::Xml => write_report_file(&xml::render(&analysis)?, &path)?,
                ReportFormat::Csv => write_report_file(&csv::render(&analysis), &path)?,
                ReportFormat::Json => json::write_summary(&analysis, &path)?,
            }
            self.written.push(path);
        }

        self.analysis = Some(analysis);
        Ok(())
    }
}
