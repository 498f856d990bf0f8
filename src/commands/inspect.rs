//! Inspection commands: `find`, `modules`, `info` and `merge`.
//!
//! These run single pieces of the aggregation pipeline so a build setup
//! can be checked without rendering a report.

use crate::discovery::find_files;
use crate::exec::{
    write_merged, Accumulator, ExecFileLoader, ExecutionDataLoader, ExecutionDataReader, RecordList,
};
use crate::reactor::{describe_modules, select_data_sources, select_modules, BuildGraph};
use anyhow::{bail, Context, Result};
use chrono::DateTime;
use log::info;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Print the execution data files located under `base_dir`
///
/// **Public** - runs the data file locator on its own
pub fn execute_find(base_dir: &Path, includes: &[String], excludes: &[String]) -> Result<Vec<PathBuf>> {
    let files = find_files(base_dir, includes, excludes).with_context(|| format!("Failed to search {}", base_dir.display()))?;

    if files.is_empty() {
        println!("No execution data files found in {}", base_dir.display());
    }
    for file in &files {
        println!("{}", file.display());
    }

    Ok(files)
}

/// Print the module selection for a reactor manifest
pub fn display_modules(manifest: &Path, default_encoding: &str) -> Result<()> {
    let graph = BuildGraph::from_file(manifest, default_encoding)
        .with_context(|| format!("Failed to read reactor manifest {}", manifest.display()))?;

    println!("Root: {} ({})", graph.root.id, graph.root.base_dir.display());
    println!("Execution root: {}", graph.execution_root);
    println!();

    for module in &graph.modules {
        println!("  {:<40} {:<9} {}", module.id.to_string(), module.scope.to_string(), module.base_dir.display());
    }
    println!();

    let report_modules = select_modules(&graph.modules);
    let data_sources = select_data_sources(&graph.modules);
    println!("Report groups:  {}", describe_modules(&report_modules));
    println!("Data sources:   {}", describe_modules(&data_sources));

    Ok(())
}

/// Print the sessions and class records of one execution data file
pub fn display_exec_info(file_path: &Path, show_classes: bool) -> Result<()> {
    let file = File::open(file_path)
        .with_context(|| format!("Failed to open {}", file_path.display()))?;

    let mut records = RecordList::default();
    ExecutionDataReader::new(BufReader::new(file))
        .read(&mut records)
        .with_context(|| format!("Invalid execution data file {}", file_path.display()))?;

    println!("Execution data: {}", file_path.display());
    println!("  Sessions: {}", records.sessions.len());
    for session in &records.sessions {
        println!(
            "    {} start={} dump={}",
            session.id,
            format_millis(session.start),
            format_millis(session.dump)
        );
    }

    let probes: usize = records.classes.iter().map(|c| c.probes.len()).sum();
    let covered: usize = records.classes.iter().map(|c| c.covered_probes()).sum();
    println!("  Classes: {}", records.classes.len());
    println!("  Probes: {}/{} covered", covered, probes);

    if show_classes {
        for class in &records.classes {
            println!(
                "    {:016x} {} {}/{}",
                class.id,
                class.name,
                class.covered_probes(),
                class.probes.len()
            );
        }
    }

    Ok(())
}

/// Merge several execution data files into one
///
/// **Public** - the merged file is readable by any `.exec` consumer
pub fn execute_merge(inputs: &[PathBuf], output: &Path) -> Result<()> {
    if inputs.is_empty() {
        bail!("No input files given");
    }

    let loader = ExecFileLoader;
    let mut accumulator = Accumulator::new();

    for input in inputs {
        info!("Merging {}", input.display());
        let file = File::open(input)
            .with_context(|| format!("Failed to open {}", input.display()))?;
        loader
            .load(&mut BufReader::new(file), &mut accumulator)
            .with_context(|| format!("Failed to merge {}", input.display()))?;
        accumulator.record_file(input);
    }

    let merged = accumulator.freeze();
    write_merged(&merged, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "✓ Merged {} file(s), {} class(es) into {}",
        merged.files().len(),
        merged.execution_data().len(),
        output.display()
    );

    Ok(())
}

fn format_millis(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{ExecutionData, ExecutionDataWriter, SessionInfo};

    fn write_exec(path: &Path, data: ExecutionData) {
        let mut writer = ExecutionDataWriter::new(File::create(path).unwrap()).unwrap();
        writer.write_session(&SessionInfo::new("s", 0, 1)).unwrap();
        writer.write_class(&data).unwrap();
        writer.into_inner().unwrap();
    }

    #[test]
    fn test_merge_combines_probes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.exec");
        let b = dir.path().join("b.exec");
        let out = dir.path().join("out/merged.exec");
        write_exec(&a, ExecutionData::new(5, "x/X", vec![true, false]));
        write_exec(&b, ExecutionData::new(5, "x/X", vec![false, true]));

        execute_merge(&[a, b], &out).unwrap();

        let mut records = RecordList::default();
        ExecutionDataReader::new(File::open(&out).unwrap())
            .read(&mut records)
            .unwrap();
        assert_eq!(records.classes.len(), 1);
        assert_eq!(records.classes[0].probes, vec![true, true]);
        assert_eq!(records.sessions.len(), 2);
    }

    #[test]
    fn test_merge_requires_inputs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(execute_merge(&[], &dir.path().join("out.exec")).is_err());
    }

    #[test]
    fn test_find_default_pattern() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("target")).unwrap();
        std::fs::write(dir.path().join("target/jacoco.exec"), b"").unwrap();

        let files = execute_find(dir.path(), &[], &[]).unwrap();
        assert_eq!(files.len(), 1);
    }
}
