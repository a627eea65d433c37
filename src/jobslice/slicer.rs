//! # Slicing
//!
//! Work items are numbered from 1 and grouped into directories of at most
//! `slice_size` entries, so that no single directory ends up holding millions
//! of files:
//!
//! ```text
//! input/
//! ├── 1/        # items 1 ..= slice_size
//! │   ├── 1
//! │   └── 2
//! └── 2/        # items slice_size + 1 ..= 2 * slice_size
//! ```
//!
//! The same numbering is used for the input, output and error trees, and is
//! reproduced by the generated worker script.

use std::path::{Path, PathBuf};

pub const DEFAULT_SLICE_SIZE: u64 = 1000;

/// Returns the slice an item index falls into.
///
/// Both arguments must be positive.
pub fn slice_of(index: u64, slice_size: u64) -> u64 {
    (index - 1) / slice_size + 1
}

/// A sliced directory tree rooted at `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceLayout {
    root: PathBuf,
    slice_size: u64,
}

impl SliceLayout {
    pub fn new(root: impl Into<PathBuf>, slice_size: u64) -> Self {
        Self {
            root: root.into(),
            slice_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn slice_of(&self, index: u64) -> u64 {
        slice_of(index, self.slice_size)
    }

    pub fn slice_dir(&self, index: u64) -> PathBuf {
        self.root.join(self.slice_of(index).to_string())
    }

    pub fn item_path(&self, index: u64) -> PathBuf {
        self.slice_dir(index).join(index.to_string())
    }
}
