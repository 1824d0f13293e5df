//! Catalogue: ordered, deduplicated annotation records

use crate::core::record::IntervalRecord;
use crate::core::temporal::TimeRange;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Annotation records merged from one or more sources.
///
/// A merged catalogue is ordered by insertion time, not by begin time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalCatalogue {
    records: Vec<IntervalRecord>,
}

impl IntervalCatalogue {
    /// Create an empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, dropping exact duplicates and keeping the first
    /// occurrence of each
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = IntervalRecord>,
    {
        let mut catalogue = Self::new();
        catalogue.append_unique(records);
        catalogue
    }

    /// Append records that are not already present
    pub fn append_unique<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = IntervalRecord>,
    {
        let mut seen: AHashSet<IntervalRecord> = self.records.iter().cloned().collect();
        let before = self.records.len();
        for record in records {
            if seen.insert(record.clone()) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    /// Stable sort by insertion time
    pub fn sort_by_insertion(&mut self) {
        self.records.sort_by_key(IntervalRecord::insertion_time);
    }

    /// Get all records
    pub fn records(&self) -> &[IntervalRecord] {
        &self.records
    }

    /// Iterate over records
    pub fn iter(&self) -> impl Iterator<Item = &IntervalRecord> {
        self.records.iter()
    }

    /// Get number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if catalogue is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any record carries this event type
    pub fn has_event_type(&self, event_type: &str) -> bool {
        self.records.iter().any(|r| r.event_type() == event_type)
    }

    /// Distinct event types in first-seen order
    pub fn event_types(&self) -> Vec<&str> {
        let mut seen = AHashSet::new();
        self.records
            .iter()
            .map(|r| r.event_type())
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// Records whose closed interval overlaps `range`
    pub fn in_range(&self, range: &TimeRange) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| r.interval().overlaps(range))
                .cloned()
                .collect(),
        }
    }

    /// Records where `mask` is set. `mask` is aligned to `records()`.
    pub fn select(&self, mask: &[bool]) -> Self {
        self.partition(mask).0
    }

    /// Split into (masked, unmasked), both keeping catalogue order
    pub fn partition(&self, mask: &[bool]) -> (Self, Self) {
        debug_assert_eq!(mask.len(), self.records.len());
        let mut selected = Vec::new();
        let mut rest = Vec::new();
        for (record, keep) in self.records.iter().zip(mask.iter()) {
            if *keep {
                selected.push(record.clone());
            } else {
                rest.push(record.clone());
            }
        }
        (Self { records: selected }, Self { records: rest })
    }
}

impl IntoIterator for IntervalCatalogue {
    type Item = IntervalRecord;
    type IntoIter = std::vec::IntoIter<IntervalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a IntervalCatalogue {
    type Item = &'a IntervalRecord;
    type IntoIter = std::slice::Iter<'a, IntervalRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<IntervalRecord> for IntervalCatalogue {
    fn from_iter<I: IntoIterator<Item = IntervalRecord>>(iter: I) -> Self {
        Self::from_records(iter)
    }
}
