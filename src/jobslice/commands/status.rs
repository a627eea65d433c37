use crate::commands::{CmdMessage, CmdResult, JobPaths};
use crate::error::{JobError, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub manifest_present: bool,
    /// Records read by the extraction, when known
    pub total: Option<u64>,
    pub script_present: bool,
    pub input_items: u64,
    pub output_items: u64,
    /// Tasks whose error file is not empty
    pub failed_items: u64,
}

pub fn run(paths: &JobPaths) -> Result<CmdResult> {
    let manifest = paths.manifest();
    let manifest_present = manifest.exists();
    let total = if manifest_present {
        manifest.count()?
    } else {
        None
    };

    let report = StatusReport {
        manifest_present,
        total,
        script_present: paths.script_path().is_file(),
        input_items: count_items(&paths.input_dir(), false)?,
        output_items: count_items(&paths.output_dir(), false)?,
        failed_items: count_items(&paths.error_dir(), true)?,
    };

    let mut result = CmdResult::default();
    if !manifest_present {
        result.add_message(CmdMessage::info(
            "Not prepared yet: run `jobslice prepare`.",
        ));
    } else if !report.script_present {
        result.add_message(CmdMessage::warning(
            "Worker script is missing: run `jobslice prepare` to regenerate it.",
        ));
    }
    if report.failed_items > 0 {
        result.add_message(CmdMessage::warning(format!(
            "{} task(s) wrote to their error file; see {}",
            report.failed_items,
            paths.error_dir().display()
        )));
    }
    Ok(result.with_status(report))
}

/// Counts item files across the slice directories under `root`.
fn count_items(root: &Path, non_empty_only: bool) -> Result<u64> {
    if !root.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for slice in fs::read_dir(root).map_err(|e| JobError::fs(root, e))? {
        let slice = slice.map_err(|e| JobError::fs(root, e))?.path();
        if !slice.is_dir() {
            continue;
        }
        for item in fs::read_dir(&slice).map_err(|e| JobError::fs(&slice, e))? {
            let item = item.map_err(|e| JobError::fs(&slice, e))?;
            let meta = item.metadata().map_err(|e| JobError::fs(item.path(), e))?;
            if meta.is_file() && (!non_empty_only || meta.len() > 0) {
                count += 1;
            }
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;

    #[test]
    fn test_status_of_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = JobPaths::new(dir.path(), Layout::default());
        let result = run(&paths).unwrap();
        assert_eq!(result.status, Some(StatusReport::default()));
        assert!(result.messages[0].content.contains("Not prepared"));
    }

    #[test]
    fn test_status_counts_items() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let paths = JobPaths::new(root, Layout::default());
        fs::write(paths.manifest().path(), "1\tA\n2\tB\n4\tD\n").unwrap();
        fs::write(paths.script_path(), "#!/bin/sh\n").unwrap();
        for sub in ["input/1", "input/2", "output/1", "error/1"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        fs::write(root.join("input/1/1"), "a").unwrap();
        fs::write(root.join("input/1/2"), "b").unwrap();
        fs::write(root.join("input/2/4"), "d").unwrap();
        fs::write(root.join("output/1/1"), "hit").unwrap();
        fs::write(root.join("output/1/2"), "").unwrap();
        fs::write(root.join("error/1/1"), "").unwrap();
        fs::write(root.join("error/1/2"), "segfault").unwrap();

        let result = run(&paths).unwrap();
        let report = result.status.unwrap();
        assert!(report.manifest_present);
        assert_eq!(report.total, Some(4));
        assert!(report.script_present);
        assert_eq!(report.input_items, 3);
        assert_eq!(report.output_items, 2);
        assert_eq!(report.failed_items, 1);
        assert!(result.messages[0].content.contains("1 task(s)"));
    }
}
