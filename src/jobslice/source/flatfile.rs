use super::{Record, RecordSource, SourceFormat};
use crate::error::{JobError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grammar {
    Fasta,
    Flat,
}

/// Splits a flatfile into entries without interpreting their contents.
///
/// Entry bytes are kept exactly as read, line endings included.
pub struct FlatFileSource<R: BufRead = BufReader<File>> {
    reader: R,
    origin: String,
    grammar: Option<Grammar>,
    pending: Option<Vec<u8>>,
    line_no: u64,
}

impl FlatFileSource {
    pub fn open(path: &Path, format: SourceFormat) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            JobError::Source(format!("cannot open {}: {}", path.display(), e))
        })?;
        Ok(Self::from_reader(
            BufReader::new(file),
            path.display().to_string(),
            format,
        ))
    }
}

impl<R: BufRead> FlatFileSource<R> {
    pub fn from_reader(reader: R, origin: impl Into<String>, format: SourceFormat) -> Self {
        let grammar = match format {
            SourceFormat::Auto => None,
            SourceFormat::Fasta => Some(Grammar::Fasta),
            SourceFormat::Flat => Some(Grammar::Flat),
        };
        Self {
            reader,
            origin: origin.into(),
            grammar,
            pending: None,
            line_no: 0,
        }
    }

    fn error(&self, message: impl std::fmt::Display) -> JobError {
        JobError::Source(format!("{}:{}: {}", self.origin, self.line_no, message))
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        let mut buf = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| self.error(format!("read failed: {}", e)))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(buf))
    }

    fn fasta_entry(&mut self, header: Vec<u8>) -> Result<Record> {
        if !header.starts_with(b">") {
            return Err(self.error("expected a '>' header line"));
        }
        let identifier = String::from_utf8_lossy(&header[1..])
            .split_whitespace()
            .next()
            .map(str::to_string)
            .ok_or_else(|| self.error("FASTA header without identifier"))?;

        let mut raw = header;
        while let Some(line) = self.read_line()? {
            if line.starts_with(b">") {
                self.pending = Some(line);
                break;
            }
            raw.extend_from_slice(&line);
        }
        Ok(Record { identifier, raw })
    }

    fn flat_entry(&mut self, first: Vec<u8>) -> Result<Record> {
        if is_terminator(&first) {
            return Err(self.error("empty entry"));
        }
        let identifier = entry_identifier(&first)
            .ok_or_else(|| self.error("entry without identifier"))?;

        let mut raw = first;
        loop {
            match self.read_line()? {
                Some(line) => {
                    raw.extend_from_slice(&line);
                    if is_terminator(&line) {
                        return Ok(Record { identifier, raw });
                    }
                }
                None => {
                    return Err(self.error(format!(
                        "entry {} is not terminated by '//'",
                        identifier
                    )))
                }
            }
        }
    }
}

impl<R: BufRead> RecordSource for FlatFileSource<R> {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        let first = loop {
            match self.read_line()? {
                None => return Ok(None),
                Some(line) if line.trim_ascii().is_empty() => continue,
                Some(line) => break line,
            }
        };

        let grammar = match self.grammar {
            Some(grammar) => grammar,
            None => {
                let detected = if first.starts_with(b">") {
                    Grammar::Fasta
                } else {
                    Grammar::Flat
                };
                debug!(origin = %self.origin, format = ?detected, "detected source format");
                self.grammar = Some(detected);
                detected
            }
        };

        let record = match grammar {
            Grammar::Fasta => self.fasta_entry(first)?,
            Grammar::Flat => self.flat_entry(first)?,
        };
        Ok(Some(record))
    }
}

fn is_terminator(line: &[u8]) -> bool {
    line.trim_ascii() == b"//"
}

/// `LOCUS  X ...`, `ID   X; ...` and `ENTRY  X ...` all carry the name in the
/// second column. A lone token is used as is.
fn entry_identifier(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let mut tokens = text.split_whitespace();
    let first = tokens.next()?;
    let name = tokens.next().unwrap_or(first).trim_end_matches(';');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
