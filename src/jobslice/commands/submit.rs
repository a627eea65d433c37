//! # Submission
//!
//! Submits the worker script as an array job over `task_min..=task_max`.
//!
//! Schedulers cap how many tasks one array submission may span, so the range
//! is cut into chunks of `array_limit` tasks and the launcher is called once
//! per chunk:
//!
//! ```text
//! task_min=1 task_max=120000 array_limit=50000
//!
//!   qsub ... -t 1-50001:1000       worker.sh
//!   qsub ... -t 50001-100001:1000  worker.sh
//!   qsub ... -t 100001-120000:1000 worker.sh
//! ```
//!
//! Every chunk gets its own [`ChunkOutcome`]. A chunk the scheduler rejects
//! does not stop the others, so the report tells the operator exactly which
//! ranges to resubmit (`--task-min`/`--task-max`).

use crate::commands::JobPaths;
use crate::config::JobConfig;
use crate::error::{JobError, Result};
use crate::launcher::{Invocation, LaunchOutcome, Launcher};
use std::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    /// The `-t` argument for this chunk.
    pub fn range_spec(&self, step: u64) -> String {
        format!("{}-{}:{}", self.start, self.end, step)
    }
}

#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    pub chunk: Chunk,
    pub invocation: Invocation,
    pub outcome: LaunchOutcome,
}

#[derive(Debug, Clone)]
pub struct SubmitReport {
    pub total: u64,
    pub task_min: u64,
    pub task_max: u64,
    pub task_step: u64,
    pub chunks: Vec<ChunkOutcome>,
}

impl SubmitReport {
    pub fn failures(&self) -> impl Iterator<Item = &ChunkOutcome> {
        self.chunks.iter().filter(|c| c.outcome.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Cuts `task_min..=task_max` into chunks starting every `ceiling` tasks.
///
/// A chunk ends at `start + ceiling`, clamped to `task_max`; consecutive
/// chunks therefore share their boundary task.
pub fn plan_chunks(task_min: u64, task_max: u64, ceiling: u64) -> Vec<Chunk> {
    let ceiling = ceiling.max(1);
    let mut chunks = Vec::new();
    let mut offset = task_min;

    while offset <= task_max {
        chunks.push(Chunk {
            start: offset,
            end: offset.saturating_add(ceiling).min(task_max),
        });
        match offset.checked_add(ceiling) {
            Some(next) => offset = next,
            None => break,
        }
    }
    chunks
}

/// Submits the prepared job.
///
/// `known_total` skips reading the manifest when the caller just extracted.
pub fn run<L: Launcher>(
    launcher: &L,
    paths: &JobPaths,
    config: &JobConfig,
    known_total: Option<u64>,
) -> Result<SubmitReport> {
    let total = match known_total {
        Some(total) => total,
        None => paths.manifest().total()?,
    };

    let script = paths.script_path();
    if !script.is_file() {
        return Err(JobError::Submission(format!(
            "worker script {} not found; run prepare first",
            script.display()
        )));
    }

    let task_min = config.task_min.unwrap_or(1);
    let task_max = config.task_max.unwrap_or(total);
    let task_step = config.task_step();
    let chunks = plan_chunks(task_min, task_max, config.array_limit);
    info!(
        total,
        task_min,
        task_max,
        task_step,
        chunks = chunks.len(),
        "submitting array job"
    );

    let log_dir = paths.log_dir();
    if !chunks.is_empty() && !launcher.is_dry_run() && !log_dir.exists() {
        fs::create_dir_all(&log_dir).map_err(|e| JobError::fs(&log_dir, e))?;
    }

    let mut outcomes = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let invocation = build_invocation(paths, config, chunk, task_step);
        let outcome = launcher.launch(&invocation);
        if outcome.is_failure() {
            warn!(range = %chunk.range_spec(task_step), %outcome, "chunk submission failed");
        } else {
            debug!(range = %chunk.range_spec(task_step), %outcome, "chunk submitted");
        }
        outcomes.push(ChunkOutcome {
            chunk,
            invocation,
            outcome,
        });
    }

    Ok(SubmitReport {
        total,
        task_min,
        task_max,
        task_step,
        chunks: outcomes,
    })
}

fn build_invocation(paths: &JobPaths, config: &JobConfig, chunk: Chunk, step: u64) -> Invocation {
    let log_dir = paths.log_dir().display().to_string();
    Invocation::new(config.launcher.as_str())
        .args(config.scheduler_options.split_whitespace())
        .args(["-o", log_dir.as_str(), "-e", log_dir.as_str(), "-cwd"])
        .arg("-t")
        .arg(chunk.range_spec(step))
        .arg(paths.script_path().display().to_string())
        .current_dir(paths.work_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::launcher::DryRunLauncher;
    use std::cell::RefCell;
    use std::path::Path;

    /// Records invocations; chunks starting at a listed task fail.
    #[derive(Default)]
    struct RecordingLauncher {
        calls: RefCell<Vec<Invocation>>,
        failing_starts: Vec<String>,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, invocation: &Invocation) -> LaunchOutcome {
            self.calls.borrow_mut().push(invocation.clone());
            let range = invocation
                .args
                .iter()
                .skip_while(|a| a.as_str() != "-t")
                .nth(1)
                .cloned()
                .unwrap_or_default();
            if self
                .failing_starts
                .iter()
                .any(|start| range.starts_with(&format!("{}-", start)))
            {
                LaunchOutcome::Failed { code: Some(2) }
            } else {
                LaunchOutcome::Success
            }
        }
    }

    fn prepared(dir: &Path, manifest: Option<&str>) -> JobPaths {
        let paths = JobPaths::new(dir, Layout::default());
        fs::write(paths.script_path(), "#!/bin/sh\n").unwrap();
        if let Some(rows) = manifest {
            fs::write(paths.manifest().path(), rows).unwrap();
        }
        paths
    }

    #[test]
    fn test_plan_chunks_clamps_last_end() {
        assert_eq!(
            plan_chunks(1, 120_000, 50_000),
            vec![
                Chunk {
                    start: 1,
                    end: 50_001
                },
                Chunk {
                    start: 50_001,
                    end: 100_001
                },
                Chunk {
                    start: 100_001,
                    end: 120_000
                },
            ]
        );
    }

    #[test]
    fn test_plan_chunks_small_ranges() {
        assert_eq!(plan_chunks(1, 3, 50_000), vec![Chunk { start: 1, end: 3 }]);
        assert_eq!(plan_chunks(7, 7, 50_000), vec![Chunk { start: 7, end: 7 }]);
        assert!(plan_chunks(5, 4, 50_000).is_empty());
        assert!(plan_chunks(1, 0, 50_000).is_empty());
    }

    #[test]
    fn test_plan_chunks_near_u64_max() {
        let chunks = plan_chunks(u64::MAX - 1, u64::MAX, 10);
        assert_eq!(
            chunks,
            vec![Chunk {
                start: u64::MAX - 1,
                end: u64::MAX
            }]
        );
    }

    #[test]
    fn test_single_chunk_command_shape() {
        let dir = tempfile::tempdir().unwrap();
        let paths = prepared(dir.path(), Some("1\tA\n2\tB\n3\tC\n"));
        let config = JobConfig {
            scheduler_options: "-q  long.q -l h_vmem=4G".to_string(),
            ..JobConfig::default()
        };
        let launcher = RecordingLauncher::default();

        let report = run(&launcher, &paths, &config, None).unwrap();

        assert_eq!(report.total, 3);
        assert_eq!(report.chunks.len(), 1);
        let calls = launcher.calls.borrow();
        let log_dir = dir.path().join("log").display().to_string();
        let script = dir.path().join("worker.sh").display().to_string();
        assert_eq!(calls[0].program, "qsub");
        assert_eq!(
            calls[0].args,
            vec![
                "-q",
                "long.q",
                "-l",
                "h_vmem=4G",
                "-o",
                log_dir.as_str(),
                "-e",
                log_dir.as_str(),
                "-cwd",
                "-t",
                "1-3:1000",
                script.as_str(),
            ]
        );
        assert_eq!(calls[0].cwd.as_deref(), Some(dir.path()));
        assert!(dir.path().join("log").is_dir());
    }

    #[test]
    fn test_failed_chunk_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let paths = prepared(dir.path(), None);
        let config = JobConfig {
            array_limit: 10,
            task_step: Some(5),
            ..JobConfig::default()
        };
        let launcher = RecordingLauncher {
            failing_starts: vec!["11".to_string()],
            ..RecordingLauncher::default()
        };

        let report = run(&launcher, &paths, &config, Some(25)).unwrap();

        let ranges: Vec<_> = report
            .chunks
            .iter()
            .map(|c| c.chunk.range_spec(report.task_step))
            .collect();
        assert_eq!(ranges, vec!["1-11:5", "11-21:5", "21-25:5"]);
        assert_eq!(launcher.calls.borrow().len(), 3);
        assert!(report.has_failures());
        let failed: Vec<_> = report.failures().map(|c| c.chunk.start).collect();
        assert_eq!(failed, vec![11]);
        assert_eq!(report.chunks[2].outcome, LaunchOutcome::Success);
    }

    #[test]
    fn test_task_bounds_override_total() {
        let dir = tempfile::tempdir().unwrap();
        let paths = prepared(dir.path(), Some("1\tA\n2\tB\n"));
        let config = JobConfig {
            task_min: Some(100),
            task_max: Some(200),
            task_step: Some(1),
            ..JobConfig::default()
        };
        let launcher = RecordingLauncher::default();

        let report = run(&launcher, &paths, &config, None).unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.chunks[0].chunk.range_spec(1), "100-200:1");
    }

    #[test]
    fn test_missing_manifest_attempts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = prepared(dir.path(), None);
        let launcher = RecordingLauncher::default();

        let err = run(&launcher, &paths, &JobConfig::default(), None).unwrap_err();
        assert!(matches!(err, JobError::Submission(_)));
        assert!(launcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_manifest_attempts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = prepared(dir.path(), Some(""));
        let launcher = RecordingLauncher::default();

        let err = run(&launcher, &paths, &JobConfig::default(), None).unwrap_err();
        assert!(matches!(err, JobError::Submission(_)));
        assert!(launcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_script_attempts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = JobPaths::new(dir.path(), Layout::default());
        let launcher = RecordingLauncher::default();

        let err = run(&launcher, &paths, &JobConfig::default(), Some(10)).unwrap_err();
        assert!(err.to_string().contains("worker script"));
        assert!(launcher.calls.borrow().is_empty());
    }

    #[test]
    fn test_dry_run_leaves_log_dir_alone() {
        let dir = tempfile::tempdir().unwrap();
        let paths = prepared(dir.path(), Some("1\tA\n2\tB\n"));

        let report = run(&DryRunLauncher, &paths, &JobConfig::default(), None).unwrap();

        assert_eq!(report.chunks.len(), 1);
        assert_eq!(report.chunks[0].outcome, LaunchOutcome::Skipped);
        assert!(!dir.path().join("log").exists());
    }

    #[test]
    fn test_known_total_of_zero_submits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = prepared(dir.path(), None);
        let launcher = RecordingLauncher::default();

        let report = run(&launcher, &paths, &JobConfig::default(), Some(0)).unwrap();
        assert!(report.chunks.is_empty());
        assert!(!dir.path().join("log").exists());
    }
}
