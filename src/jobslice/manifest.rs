//! # Manifest
//!
//! The manifest maps each extracted item's index to the identifier of the
//! record it came from, one `<index>\t<identifier>` line per item, in the
//! order items were extracted.
//!
//! It is written once and never rewritten. Its presence on disk means
//! extraction already happened. Once extraction completes, the number of
//! records read (filtered ones included) is stored next to it in
//! `<manifest>.count`, so a later run reports the same count the extraction
//! did. Removing both (`clean`) is the only way to re-extract.

use crate::error::{JobError, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub index: u64,
    pub identifier: String,
}

impl ManifestEntry {
    fn parse(line: &str) -> Option<Self> {
        let (index, identifier) = line.split_once('\t')?;
        let index = index.trim().parse().ok()?;
        Some(Self {
            index,
            identifier: identifier.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
}

impl Manifest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether extraction has already run for this manifest.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Creates an empty manifest, along with its parent directory.
    pub fn create(&self) -> Result<ManifestWriter> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| JobError::fs(parent, e))?;
            }
        }
        let file = File::create(&self.path).map_err(|e| JobError::fs(&self.path, e))?;
        Ok(ManifestWriter {
            path: self.path.clone(),
            writer: BufWriter::new(file),
            rows: 0,
        })
    }

    /// Companion file holding the record count of the finished extraction.
    pub fn count_path(&self) -> PathBuf {
        let mut path = self.path.clone().into_os_string();
        path.push(".count");
        PathBuf::from(path)
    }

    /// Stores the number of records the extraction read.
    pub fn record_count(&self, count: u64) -> Result<()> {
        let path = self.count_path();
        fs::write(&path, format!("{}\n", count)).map_err(|e| JobError::fs(&path, e))
    }

    /// Records read by the extraction that wrote this manifest. Falls back to
    /// the last row index when no count was stored (interrupted extraction
    /// or a hand-written manifest).
    pub fn count(&self) -> Result<Option<u64>> {
        let path = self.count_path();
        match fs::read_to_string(&path) {
            Ok(text) => text.trim().parse().map(Some).map_err(|_| {
                JobError::Submission(format!(
                    "malformed record count in {}: {:?}",
                    path.display(),
                    text.trim()
                ))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => self.last_index(),
            Err(e) => Err(JobError::fs(&path, e)),
        }
    }

    /// Index of the last row, `None` for an empty manifest.
    pub fn last_index(&self) -> Result<Option<u64>> {
        let mut last = None;
        self.scan(|entry| last = Some(entry.index))?;
        Ok(last)
    }

    /// The item count submission works from.
    pub fn total(&self) -> Result<u64> {
        if !self.exists() {
            return Err(JobError::Submission(format!(
                "manifest {} not found; run prepare first",
                self.path.display()
            )));
        }
        if self.last_index()?.is_none() {
            return Err(JobError::Submission(format!(
                "manifest {} is empty",
                self.path.display()
            )));
        }
        Ok(self.count()?.unwrap_or(0))
    }

    fn scan(&self, mut visit: impl FnMut(ManifestEntry)) -> Result<()> {
        let file = File::open(&self.path).map_err(|e| JobError::fs(&self.path, e))?;
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| JobError::fs(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = ManifestEntry::parse(&line).ok_or_else(|| {
                JobError::Submission(format!(
                    "malformed manifest line {} in {}: {:?}",
                    line_no + 1,
                    self.path.display(),
                    line
                ))
            })?;
            visit(entry);
        }
        Ok(())
    }
}

/// Appends rows to a freshly created manifest.
pub struct ManifestWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: u64,
}

impl ManifestWriter {
    pub fn append(&mut self, index: u64, identifier: &str) -> Result<()> {
        if identifier.contains(&['\t', '\n', '\r'][..]) {
            return Err(JobError::Source(format!(
                "identifier {:?} of item {} contains a tab or line break",
                identifier, index
            )));
        }
        writeln!(self.writer, "{}\t{}", index, identifier)
            .map_err(|e| JobError::fs(&self.path, e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes buffered rows to disk.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| JobError::fs(&self.path, e))
    }

    pub fn finish(mut self) -> Result<u64> {
        self.flush()?;
        Ok(self.rows)
    }
}
