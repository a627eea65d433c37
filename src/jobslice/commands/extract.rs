//! # Extraction
//!
//! Splits a record source into one file per record under the sliced input
//! tree, logging each written item in the manifest.
//!
//! Items are numbered by their position in the source. Records outside the
//! requested [`IndexRange`] still advance the count, they are just not
//! written, so the manifest of a filtered run has gaps where the skipped
//! records were:
//!
//! ```text
//! source:   A  B  C  D  E       range 2..=3
//! count:    1  2  3  4  5
//! manifest:    2\tB
//!                 3\tC
//! ```
//!
//! Extraction runs at most once per manifest. When the manifest is already
//! there the source is not even opened; the caller gets back the count the
//! original extraction reported, which is what makes re-running `prepare` or
//! `run` safe.

use crate::error::{JobError, Result};
use crate::manifest::{Manifest, ManifestWriter};
use crate::slicer::SliceLayout;
use crate::source::RecordSource;
use std::fs;
use tracing::{debug, info};

/// Inclusive bounds on item indices; absent bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl IndexRange {
    pub fn new(min: Option<u64>, max: Option<u64>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, index: u64) -> bool {
        self.min.map_or(true, |min| index >= min) && self.max.map_or(true, |max| index <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    /// The manifest already existed and nothing was read
    pub skipped: bool,
    /// Records read from the source, or the manifest's last index when skipped
    pub total: u64,
    /// Items written in this run
    pub written: u64,
}

/// Extracts records into `input` unless `manifest` already exists.
///
/// `open` is only called when extraction actually happens.
pub fn run<R, F>(
    open: F,
    manifest: &Manifest,
    input: &SliceLayout,
    range: IndexRange,
) -> Result<ExtractReport>
where
    R: RecordSource,
    F: FnOnce() -> Result<R>,
{
    if manifest.exists() {
        let total = manifest.count()?.unwrap_or(0);
        info!(
            manifest = %manifest.path().display(),
            total,
            "manifest exists, skipping extraction"
        );
        return Ok(ExtractReport {
            skipped: true,
            total,
            written: 0,
        });
    }

    let mut source = open()?;
    info!(origin = source.origin(), input = %input.root().display(), "extracting records");

    let mut writer = manifest.create()?;
    match write_records(&mut source, &mut writer, input, range) {
        Ok(total) => {
            let written = writer.finish()?;
            manifest.record_count(total)?;
            info!(total, written, "extraction finished");
            Ok(ExtractReport {
                skipped: false,
                total,
                written,
            })
        }
        Err(e) => {
            // Keep the rows that made it; the manifest stays a valid prefix.
            if let Err(flush_err) = writer.flush() {
                debug!(error = %flush_err, "could not flush partial manifest");
            }
            Err(e)
        }
    }
}

fn write_records<R: RecordSource>(
    source: &mut R,
    writer: &mut ManifestWriter,
    input: &SliceLayout,
    range: IndexRange,
) -> Result<u64> {
    let mut count = 0;
    let mut current_slice = None;

    while let Some(record) = source.next_record()? {
        count += 1;
        if !range.contains(count) {
            continue;
        }

        let slice = input.slice_of(count);
        if current_slice != Some(slice) {
            let dir = input.slice_dir(count);
            if !dir.exists() {
                fs::create_dir_all(&dir).map_err(|e| JobError::fs(&dir, e))?;
                debug!(slice, dir = %dir.display(), "created slice directory");
            }
            current_slice = Some(slice);
        }

        let path = input.item_path(count);
        fs::write(&path, &record.raw).map_err(|e| JobError::fs(&path, e))?;
        writer.append(count, &record.identifier)?;
    }

    Ok(count)
}
