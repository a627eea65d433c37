//! # Record Sources
//!
//! A record source turns some input into a lazy sequence of [`Record`]s. The
//! extractor only needs two things from each record: a stable identifier for
//! the manifest, and the raw bytes to write into the sliced input tree.
//!
//! - [`flatfile::FlatFileSource`]: FASTA files and `//`-terminated flatfiles
//!   (GenBank, EMBL, UniProt)
//! - [`memory::MemorySource`]: records held in memory, mostly for tests
//!
//! Sources are pulled one record at a time and records are never collected,
//! so arbitrarily large databases can be split in constant memory.

use crate::error::Result;
use serde::{Deserialize, Serialize};

pub mod flatfile;
pub mod memory;

pub use flatfile::FlatFileSource;
pub use memory::MemorySource;

/// One unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub identifier: String,
    pub raw: Vec<u8>,
}

impl Record {
    pub fn new(identifier: impl Into<String>, raw: impl Into<Vec<u8>>) -> Self {
        Self {
            identifier: identifier.into(),
            raw: raw.into(),
        }
    }
}

/// How a flatfile is split into entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Decide from the first non-blank line
    #[default]
    Auto,
    /// `>` header lines start entries
    Fasta,
    /// `//` lines end entries
    Flat,
}

pub trait RecordSource {
    /// Where the records come from, for log lines and error messages.
    fn origin(&self) -> &str;

    /// Returns the next record, or `None` once the source is exhausted.
    fn next_record(&mut self) -> Result<Option<Record>>;
}
