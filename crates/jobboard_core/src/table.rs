use std::collections::HashSet;

use serde::Serialize;

use crate::record::JobRecord;

/// The merged, in-memory dataset handed to downstream consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JobTable {
    records: Vec<JobRecord>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<JobRecord>) -> Self {
        Self { records }
    }

    /// Concatenates per-source record sets, preserving the order given.
    pub fn concat<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Vec<JobRecord>>,
    {
        let mut records = Vec::new();
        for part in parts {
            records.extend(part);
        }
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<JobRecord> {
        self.records
    }

    /// Drops every record whose url was already seen, keeping the first
    /// occurrence. Returns the number of records removed.
    pub fn dedup_by_url(&mut self) -> usize {
        let before = self.records.len();
        let mut seen = HashSet::with_capacity(before);
        self.records.retain(|record| seen.insert(record.url.clone()));
        before - self.records.len()
    }
}

impl From<Vec<JobRecord>> for JobTable {
    fn from(records: Vec<JobRecord>) -> Self {
        Self::from_records(records)
    }
}

impl FromIterator<JobRecord> for JobTable {
    fn from_iter<T: IntoIterator<Item = JobRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for JobTable {
    type Item = JobRecord;
    type IntoIter = std::vec::IntoIter<JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a JobTable {
    type Item = &'a JobRecord;
    type IntoIter = std::slice::Iter<'a, JobRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
