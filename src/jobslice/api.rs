//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for all jobslice operations, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the command functions in `commands/*.rs`
//! - **Opens collaborators** (the flatfile record source) from configuration
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no printing and never exits the process.
//!
//! ## Generic Over Launcher
//!
//! `JobApi<L: Launcher>` is generic over how submissions are executed:
//! - Production: `JobApi<ProcessLauncher>`
//! - `--dry-run`: `JobApi<DryRunLauncher>`
//! - Tests: any recording launcher
//!
//! This keeps the whole pipeline testable without a scheduler installed.

use crate::commands::{self, housekeeping};
use crate::config::JobConfig;
use crate::error::Result;
use crate::launcher::{LaunchOutcome, Launcher};
use crate::source::{FlatFileSource, RecordSource};
use std::path::Path;

pub use crate::commands::{CmdMessage, CmdResult, JobPaths, MessageLevel};

pub struct JobApi<L: Launcher> {
    paths: JobPaths,
    launcher: L,
}

impl<L: Launcher> JobApi<L> {
    pub fn new(paths: JobPaths, launcher: L) -> Self {
        Self { paths, launcher }
    }

    pub fn paths(&self) -> &JobPaths {
        &self.paths
    }

    /// Splits the configured query file and writes the worker script.
    pub fn prepare(&self, config: &JobConfig) -> Result<CmdResult> {
        let format = config.format;
        commands::prepare::run(&self.paths, config, |query: &Path| {
            FlatFileSource::open(query, format)
        })
    }

    /// Like [`prepare`](Self::prepare), with records from `source` instead of the query file.
    pub fn prepare_from<R: RecordSource>(&self, config: &JobConfig, source: R) -> Result<CmdResult> {
        commands::prepare::run(&self.paths, config, |_: &Path| Ok(source))
    }

    /// Submits the prepared job. `known_total` skips reading the manifest.
    pub fn submit(&self, config: &JobConfig, known_total: Option<u64>) -> Result<CmdResult> {
        config.validate()?;
        let report = commands::submit::run(&self.launcher, &self.paths, config, known_total)?;

        let mut result = CmdResult::default();
        if report.chunks.is_empty() {
            result.add_message(CmdMessage::warning(format!(
                "No tasks in range {}-{}; nothing submitted.",
                report.task_min, report.task_max
            )));
        } else {
            let failed = report.failures().count();
            let dry_run = report
                .chunks
                .iter()
                .all(|c| c.outcome == LaunchOutcome::Skipped);
            if failed > 0 {
                result.add_message(CmdMessage::error(format!(
                    "{} of {} chunk submission(s) failed; resubmit those ranges with --task-min/--task-max.",
                    failed,
                    report.chunks.len()
                )));
            } else if dry_run {
                result.add_message(CmdMessage::info(format!(
                    "Dry run: {} chunk(s) not submitted.",
                    report.chunks.len()
                )));
            } else {
                result.add_message(CmdMessage::success(format!(
                    "Submitted tasks {}-{} in {} chunk(s).",
                    report.task_min,
                    report.task_max,
                    report.chunks.len()
                )));
            }
        }
        Ok(result.with_submit(report))
    }

    /// Prepares, then submits using the count extraction just reported.
    pub fn run(&self, config: &JobConfig) -> Result<CmdResult> {
        let prepared = self.prepare(config)?;
        let known_total = prepared.extract.as_ref().map(|r| r.total);
        let submitted = self.submit(config, known_total)?;
        Ok(prepared.merge(submitted))
    }

    pub fn status(&self) -> Result<CmdResult> {
        commands::status::run(&self.paths)
    }

    pub fn clear(&self) -> Result<CmdResult> {
        Ok(housekeeping::report(housekeeping::clear(&self.paths)?))
    }

    pub fn clean(&self) -> Result<CmdResult> {
        Ok(housekeeping::report(housekeeping::clean(&self.paths)?))
    }

    pub fn distclean(&self) -> Result<CmdResult> {
        Ok(housekeeping::report(housekeeping::distclean(&self.paths)?))
    }
}
