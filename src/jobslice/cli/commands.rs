use super::render::{print_messages, print_status, print_submit_report};
use super::setup::{Cli, Commands, JobArgs};
use clap::Parser;
use jobslice::api::{CmdResult, JobApi, JobPaths};
use jobslice::config::JobConfig;
use jobslice::error::{JobError, Result};
use jobslice::launcher::{DryRunLauncher, Launcher, ProcessLauncher};
use jobslice::logging::init_logging;
use std::path::{Path, PathBuf};
use tracing::debug;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let work_dir = resolve_work_dir(&cli.work_dir)?;
    let stored = JobConfig::load(&work_dir)?;
    debug!(work_dir = %work_dir.display(), "loaded configuration");

    match cli.command {
        Commands::Prepare { job } => {
            let config = with_overrides(stored, job);
            let api = JobApi::new(job_paths(&work_dir, &config), ProcessLauncher);
            handle_prepare(&api, &config)
        }
        Commands::Submit { job, dry_run } => {
            let config = with_overrides(stored, job);
            let paths = job_paths(&work_dir, &config);
            if dry_run {
                handle_submit(&JobApi::new(paths, DryRunLauncher), &config)
            } else {
                handle_submit(&JobApi::new(paths, ProcessLauncher), &config)
            }
        }
        Commands::Run { job, dry_run } => {
            let config = with_overrides(stored, job);
            let paths = job_paths(&work_dir, &config);
            if dry_run {
                handle_run(&JobApi::new(paths, DryRunLauncher), &config)
            } else {
                handle_run(&JobApi::new(paths, ProcessLauncher), &config)
            }
        }
        Commands::Status => {
            let api = JobApi::new(job_paths(&work_dir, &stored), DryRunLauncher);
            handle_status(&api)
        }
        Commands::Clear => {
            let api = JobApi::new(job_paths(&work_dir, &stored), DryRunLauncher);
            finish(api.clear()?)
        }
        Commands::Clean => {
            let api = JobApi::new(job_paths(&work_dir, &stored), DryRunLauncher);
            finish(api.clean()?)
        }
        Commands::Distclean => {
            let api = JobApi::new(job_paths(&work_dir, &stored), DryRunLauncher);
            finish(api.distclean()?)
        }
    }
}

/// Absolute, so the worker script and scheduler see the same paths from any cwd.
fn resolve_work_dir(dir: &Path) -> Result<PathBuf> {
    std::path::absolute(dir).map_err(|e| JobError::fs(dir, e))
}

fn with_overrides(stored: JobConfig, job: JobArgs) -> JobConfig {
    stored.merge(job.into())
}

fn job_paths(work_dir: &Path, config: &JobConfig) -> JobPaths {
    JobPaths::new(work_dir, config.layout.clone())
}

fn handle_prepare<L: Launcher>(api: &JobApi<L>, config: &JobConfig) -> Result<()> {
    finish(api.prepare(config)?)
}

fn handle_submit<L: Launcher>(api: &JobApi<L>, config: &JobConfig) -> Result<()> {
    finish(api.submit(config, None)?)
}

fn handle_run<L: Launcher>(api: &JobApi<L>, config: &JobConfig) -> Result<()> {
    finish(api.run(config)?)
}

fn handle_status<L: Launcher>(api: &JobApi<L>) -> Result<()> {
    let result = api.status()?;
    if let Some(report) = &result.status {
        print_status(report);
    }
    print_messages(&result.messages);
    Ok(())
}

/// Prints a result. Chunk failures become the process error once every
/// outcome has been shown.
fn finish(result: CmdResult) -> Result<()> {
    if let Some(report) = &result.submit {
        print_submit_report(report);
    }
    print_messages(&result.messages);

    match &result.submit {
        Some(report) if report.has_failures() => Err(JobError::Submission(format!(
            "{} of {} chunk(s) were not submitted",
            report.failures().count(),
            report.chunks.len()
        ))),
        _ => Ok(()),
    }
}
