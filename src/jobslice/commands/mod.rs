use crate::config::Layout;
use crate::manifest::Manifest;
use crate::slicer::SliceLayout;
use std::path::{Path, PathBuf};

pub mod extract;
pub mod housekeeping;
pub mod prepare;
pub mod status;
pub mod submit;

pub use extract::{ExtractReport, IndexRange};
pub use status::StatusReport;
pub use submit::{Chunk, ChunkOutcome, SubmitReport};

/// Where a job's files live: the layout names resolved against a work directory.
#[derive(Debug, Clone)]
pub struct JobPaths {
    pub work_dir: PathBuf,
    pub layout: Layout,
}

impl JobPaths {
    pub fn new(work_dir: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            work_dir: work_dir.into(),
            layout,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn input_dir(&self) -> PathBuf {
        self.work_dir.join(&self.layout.input_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.work_dir.join(&self.layout.output_dir)
    }

    pub fn error_dir(&self) -> PathBuf {
        self.work_dir.join(&self.layout.error_dir)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join(&self.layout.log_dir)
    }

    pub fn script_path(&self) -> PathBuf {
        self.work_dir.join(&self.layout.script)
    }

    pub fn manifest(&self) -> Manifest {
        Manifest::new(self.work_dir.join(&self.layout.manifest))
    }

    pub fn input_slices(&self, slice_size: u64) -> SliceLayout {
        SliceLayout::new(self.input_dir(), slice_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub extract: Option<ExtractReport>,
    pub submit: Option<SubmitReport>,
    pub status: Option<StatusReport>,
    pub script_path: Option<PathBuf>,
    pub removed_paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_extract(mut self, report: ExtractReport) -> Self {
        self.extract = Some(report);
        self
    }

    pub fn with_submit(mut self, report: SubmitReport) -> Self {
        self.submit = Some(report);
        self
    }

    pub fn with_status(mut self, report: StatusReport) -> Self {
        self.status = Some(report);
        self
    }

    pub fn with_script_path(mut self, path: PathBuf) -> Self {
        self.script_path = Some(path);
        self
    }

    pub fn with_removed_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.removed_paths = paths;
        self
    }

    /// Folds a later step's result into this one, keeping message order.
    pub fn merge(mut self, other: CmdResult) -> Self {
        self.extract = other.extract.or(self.extract);
        self.submit = other.submit.or(self.submit);
        self.status = other.status.or(self.status);
        self.script_path = other.script_path.or(self.script_path);
        self.removed_paths.extend(other.removed_paths);
        self.messages.extend(other.messages);
        self
    }
}
