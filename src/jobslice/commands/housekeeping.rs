//! Reset operations. All of them are safe to repeat: paths that are already
//! gone are skipped.
//!
//! - `clear`: worker script, output, error and log trees (keeps extracted input)
//! - `clean`: manifest, its record count and the input tree (forces re-extraction)
//! - `distclean`: both

use crate::commands::{CmdMessage, CmdResult, JobPaths};
use crate::error::{JobError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Removes a file or directory tree. Returns whether anything was removed.
pub fn remove_path(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(JobError::fs(path, e)),
    };

    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Ok(()) => {
            info!(path = %path.display(), "removed");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(JobError::fs(path, e)),
    }
}

fn remove_all(targets: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for target in targets {
        if remove_path(&target)? {
            removed.push(target);
        }
    }
    Ok(removed)
}

pub fn clear(paths: &JobPaths) -> Result<Vec<PathBuf>> {
    remove_all(vec![
        paths.script_path(),
        paths.output_dir(),
        paths.error_dir(),
        paths.log_dir(),
    ])
}

pub fn clean(paths: &JobPaths) -> Result<Vec<PathBuf>> {
    let manifest = paths.manifest();
    remove_all(vec![
        manifest.path().to_path_buf(),
        manifest.count_path(),
        paths.input_dir(),
    ])
}

pub fn distclean(paths: &JobPaths) -> Result<Vec<PathBuf>> {
    let mut removed = clear(paths)?;
    removed.extend(clean(paths)?);
    Ok(removed)
}

/// Wraps a removal list into a user-facing result.
pub fn report(removed: Vec<PathBuf>) -> CmdResult {
    let mut result = CmdResult::default();
    if removed.is_empty() {
        result.add_message(CmdMessage::info("Nothing to remove."));
    }
    for path in &removed {
        result.add_message(CmdMessage::success(format!("Removed {}", path.display())));
    }
    result.with_removed_paths(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;

    fn populated(dir: &Path) -> JobPaths {
        let paths = JobPaths::new(dir, Layout::default());
        for sub in ["input/1", "output/1", "error/1", "log"] {
            fs::create_dir_all(dir.join(sub)).unwrap();
        }
        fs::write(dir.join("input/1/1"), "x").unwrap();
        fs::write(dir.join("output/1/1"), "y").unwrap();
        fs::write(paths.script_path(), "#!/bin/sh\n").unwrap();
        fs::write(paths.manifest().path(), "1\tA\n").unwrap();
        fs::write(dir.join("jobslice.json"), "{}").unwrap();
        paths
    }

    #[test]
    fn test_clear_keeps_input() {
        let dir = tempfile::tempdir().unwrap();
        let paths = populated(dir.path());

        let removed = clear(&paths).unwrap();
        assert_eq!(removed.len(), 4);
        assert!(!paths.script_path().exists());
        assert!(!paths.output_dir().exists());
        assert!(!paths.error_dir().exists());
        assert!(!paths.log_dir().exists());
        assert!(paths.input_dir().join("1/1").exists());
        assert!(paths.manifest().exists());
    }

    #[test]
    fn test_clean_keeps_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let paths = populated(dir.path());

        let removed = clean(&paths).unwrap();
        assert_eq!(
            removed,
            vec![paths.manifest().path().to_path_buf(), paths.input_dir()]
        );
        assert!(paths.output_dir().exists());
        assert!(paths.script_path().exists());
    }

    #[test]
    fn test_clean_removes_record_count() {
        let dir = tempfile::tempdir().unwrap();
        let paths = populated(dir.path());
        let manifest = paths.manifest();
        manifest.record_count(7).unwrap();

        let removed = clean(&paths).unwrap();
        assert!(removed.contains(&manifest.count_path()));
        assert!(!manifest.count_path().exists());
    }

    #[test]
    fn test_distclean_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let paths = populated(dir.path());

        assert_eq!(distclean(&paths).unwrap().len(), 6);
        assert!(distclean(&paths).unwrap().is_empty());
        // the saved configuration survives
        assert!(dir.path().join("jobslice.json").exists());
    }

    #[test]
    fn test_remove_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!remove_path(&dir.path().join("nothing")).unwrap());
    }

    #[test]
    fn test_report_messages() {
        let empty = report(Vec::new());
        assert_eq!(empty.messages[0].content, "Nothing to remove.");

        let some = report(vec![PathBuf::from("/w/log")]);
        assert_eq!(some.removed_paths, vec![PathBuf::from("/w/log")]);
        assert_eq!(some.messages[0].content, "Removed /w/log");
    }
}
