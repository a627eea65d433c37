use crate::error::{JobError, Result};
use crate::slicer::DEFAULT_SLICE_SIZE;
use crate::source::SourceFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "jobslice.json";
pub const DEFAULT_LAUNCHER: &str = "qsub";
pub const DEFAULT_TASK_STEP: u64 = 1000;
/// Largest task range a single `qsub -t` call accepts on stock SGE installs.
pub const DEFAULT_ARRAY_LIMIT: u64 = 50_000;

/// Job configuration, stored in `<work_dir>/jobslice.json`.
///
/// Every field has a default so that partial files (or no file at all) load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JobConfig {
    /// Flatfile the records are extracted from
    pub query: Option<PathBuf>,
    pub format: SourceFormat,
    /// Database or other resource the command is run against
    pub target: Option<String>,
    /// Command template executed once per task
    pub command: Option<String>,
    /// Passed verbatim (whitespace separated) to the launcher
    pub scheduler_options: String,
    pub launcher: String,
    pub index_min: Option<u64>,
    pub index_max: Option<u64>,
    pub task_min: Option<u64>,
    pub task_max: Option<u64>,
    pub task_step: Option<u64>,
    pub slice_size: u64,
    pub array_limit: u64,
    pub layout: Layout,
    pub task_env: TaskEnv,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            query: None,
            format: SourceFormat::default(),
            target: None,
            command: None,
            scheduler_options: String::new(),
            launcher: DEFAULT_LAUNCHER.to_string(),
            index_min: None,
            index_max: None,
            task_min: None,
            task_max: None,
            task_step: None,
            slice_size: DEFAULT_SLICE_SIZE,
            array_limit: DEFAULT_ARRAY_LIMIT,
            layout: Layout::default(),
            task_env: TaskEnv::default(),
        }
    }
}

/// Names of the files and directories a job keeps under its work directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Layout {
    pub input_dir: String,
    pub output_dir: String,
    pub error_dir: String,
    pub log_dir: String,
    pub manifest: String,
    pub script: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            input_dir: "input".to_string(),
            output_dir: "output".to_string(),
            error_dir: "error".to_string(),
            log_dir: "log".to_string(),
            manifest: "manifest.tsv".to_string(),
            script: "worker.sh".to_string(),
        }
    }
}

/// Environment variables the scheduler sets for each array task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TaskEnv {
    pub task_id: String,
    pub step_size: String,
    pub last_task: String,
}

impl Default for TaskEnv {
    fn default() -> Self {
        Self {
            task_id: "SGE_TASK_ID".to_string(),
            step_size: "SGE_TASK_STEPSIZE".to_string(),
            last_task: "SGE_TASK_LAST".to_string(),
        }
    }
}

/// Values given on the command line, layered over the stored config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub query: Option<PathBuf>,
    pub format: Option<SourceFormat>,
    pub target: Option<String>,
    pub command: Option<String>,
    pub scheduler_options: Option<String>,
    pub launcher: Option<String>,
    pub index_min: Option<u64>,
    pub index_max: Option<u64>,
    pub task_min: Option<u64>,
    pub task_max: Option<u64>,
    pub task_step: Option<u64>,
    pub slice_size: Option<u64>,
    pub array_limit: Option<u64>,
}

impl JobConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content =
            fs::read_to_string(&config_path).map_err(|e| JobError::fs(&config_path, e))?;
        let config: JobConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(|e| JobError::fs(config_dir, e))?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, content).map_err(|e| JobError::fs(&config_path, e))?;
        Ok(())
    }

    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if overrides.query.is_some() {
            self.query = overrides.query;
        }
        if let Some(format) = overrides.format {
            self.format = format;
        }
        if overrides.target.is_some() {
            self.target = overrides.target;
        }
        if overrides.command.is_some() {
            self.command = overrides.command;
        }
        if let Some(options) = overrides.scheduler_options {
            self.scheduler_options = options;
        }
        if let Some(launcher) = overrides.launcher {
            self.launcher = launcher;
        }
        if overrides.index_min.is_some() {
            self.index_min = overrides.index_min;
        }
        if overrides.index_max.is_some() {
            self.index_max = overrides.index_max;
        }
        if overrides.task_min.is_some() {
            self.task_min = overrides.task_min;
        }
        if overrides.task_max.is_some() {
            self.task_max = overrides.task_max;
        }
        if overrides.task_step.is_some() {
            self.task_step = overrides.task_step;
        }
        if let Some(size) = overrides.slice_size {
            self.slice_size = size;
        }
        if let Some(limit) = overrides.array_limit {
            self.array_limit = limit;
        }
        self
    }

    /// Checks the numeric settings and the scheduler options. Called before
    /// anything touches the disk.
    pub fn validate(&self) -> Result<()> {
        if self.slice_size == 0 {
            return Err(JobError::Config("slice size must be positive".into()));
        }
        if self.array_limit == 0 {
            return Err(JobError::Config("array limit must be positive".into()));
        }
        for (name, value) in [
            ("index-min", self.index_min),
            ("index-max", self.index_max),
            ("task-min", self.task_min),
            ("task-max", self.task_max),
            ("task-step", self.task_step),
        ] {
            if value == Some(0) {
                return Err(JobError::Config(format!("{} must be positive", name)));
            }
        }
        if let (Some(min), Some(max)) = (self.index_min, self.index_max) {
            if min > max {
                return Err(JobError::Config(format!(
                    "index-min ({}) is greater than index-max ({})",
                    min, max
                )));
            }
        }
        if self.launcher.trim().is_empty() {
            return Err(JobError::Config("launcher program is empty".into()));
        }
        // options are split on whitespace, so quoted values would be torn apart
        if self.scheduler_options.contains(['\'', '"']) {
            return Err(JobError::Config(format!(
                "scheduler options may not contain quotes: {}",
                self.scheduler_options
            )));
        }
        Ok(())
    }

    /// The source path and command are needed to prepare a job.
    pub fn require_prepare(&self) -> Result<(&Path, &str)> {
        let query = self
            .query
            .as_deref()
            .ok_or_else(|| JobError::Config("no query file given (use --query)".into()))?;
        let command = self
            .command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| JobError::Config("no command given (use --command)".into()))?;
        Ok((query, command))
    }

    pub fn task_step(&self) -> u64 {
        self.task_step.unwrap_or(DEFAULT_TASK_STEP)
    }
}
