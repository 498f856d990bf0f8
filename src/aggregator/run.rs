//! One aggregation run: gate, load, render.

use super::driver::{ReportDriver, RunSummary};
use super::gatekeeper::can_run;
use crate::exec::ExecutionDataLoader;
use crate::reactor::{log_selection, select_data_sources, select_modules, BuildGraph};
use crate::report::ReportRenderer;
use crate::utils::config::AggregateSettings;
use crate::utils::error::AggregateError;
use log::debug;
use std::fmt;

/// Phase of an aggregation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Gated,
    Loading,
    Rendering,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Gated => "gated",
            RunState::Loading => "loading",
            RunState::Rendering => "rendering",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a run that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Deferred or blocked by the gatekeeper; nothing was read or written
    Skipped,
    Completed(RunSummary),
}

/// Drives a single aggregation from the build graph to the rendered report
///
/// **Public** - library entry point used by the `report` command
pub struct Aggregator<'a> {
    settings: &'a AggregateSettings,
    history: Vec<RunState>,
}

impl<'a> Aggregator<'a> {
    pub fn new(settings: &'a AggregateSettings) -> Self {
        Self {
            settings,
            history: vec![RunState::Idle],
        }
    }

    /// Current phase
    pub fn state(&self) -> RunState {
        self.history.last().copied().unwrap_or(RunState::Idle)
    }

    /// Phases visited by the last run, starting with `Idle`
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Run the aggregation for `graph`
    ///
    /// Every call starts from `Idle` with a fresh accumulator.
    ///
    /// # Errors
    /// * `AggregateError::Load` - an execution data file failed to load
    /// * `AggregateError::Render` - the renderer failed
    pub fn run(
        &mut self,
        graph: &BuildGraph,
        loader: &dyn ExecutionDataLoader,
        renderer: &mut dyn ReportRenderer,
    ) -> Result<RunOutcome, AggregateError> {
        self.history = vec![RunState::Idle];
        self.enter(RunState::Gated);

        if !can_run(&graph.root, graph.execution_root, self.settings) {
            self.enter(RunState::Done);
            return Ok(RunOutcome::Skipped);
        }

        let report_modules = select_modules(&graph.modules);
        let data_sources = select_data_sources(&graph.modules);
        log_selection(&report_modules, &data_sources);

        self.enter(RunState::Loading);
        let loaded = ReportDriver::new(loader, &self.settings.data_filter)
            .load_all(&graph.root, &data_sources)?;

        self.enter(RunState::Rendering);
        let summary = loaded.render(
            renderer,
            &self.settings.title,
            &report_modules,
            &self.settings.class_filter,
        )?;

        self.enter(RunState::Done);
        Ok(RunOutcome::Completed(summary))
    }

    fn enter(&mut self, state: RunState) {
        debug!("Aggregation {} -> {}", self.state(), state);
        self.history.push(state);
    }
}
