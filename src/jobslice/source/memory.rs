use super::{Record, RecordSource};
use crate::error::Result;
use std::collections::VecDeque;

pub struct MemorySource {
    origin: String,
    records: VecDeque<Record>,
}

impl MemorySource {
    pub fn new(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            origin: "memory".to_string(),
            records: records.into_iter().collect(),
        }
    }
}

impl RecordSource for MemorySource {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        Ok(self.records.pop_front())
    }
}
