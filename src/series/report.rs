//! Artifact status report

use crate::core::catalogue::IntervalCatalogue;
use serde::{Deserialize, Serialize};

/// What happened to each catalogue record during a filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactStatusReport {
    /// The full merged catalogue for the series range
    pub lytaf: IntervalCatalogue,
    /// Matched records that removed at least one sample
    pub removed: IntervalCatalogue,
    /// Every other record of `lytaf`
    pub not_removed: IntervalCatalogue,
    /// Requested event types with no record in `lytaf`
    pub not_found: Vec<String>,
}

impl ArtifactStatusReport {
    /// Split `lytaf` by `removed_mask`
    pub fn new(lytaf: IntervalCatalogue, removed_mask: &[bool], not_found: Vec<String>) -> Self {
        let (removed, not_removed) = lytaf.partition(removed_mask);
        Self {
            lytaf,
            removed,
            not_removed,
            not_found,
        }
    }

    pub fn to_json_pretty(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
