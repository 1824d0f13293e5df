//! Catalogue loaders: where annotation records come from

use crate::core::record::{EventTypeDef, IntervalRecord, LytafSource};
use crate::core::temporal::TimeRange;
use crate::error::{Error, Result};
use crate::storage::table::AnnotationTable;
use std::collections::HashMap;

/// Trait for annotation source implementations
pub trait CatalogueLoader: Send + Sync {
    /// Records of `source` whose interval overlaps `range`, in source order
    fn load(&self, source: LytafSource, range: &TimeRange) -> Result<Vec<IntervalRecord>>;

    /// The event-type table of `source`
    fn event_types(&self, source: LytafSource) -> Result<Vec<EventTypeDef>>;

    /// `load` and `event_types` together. Loaders that fetch or read a whole
    /// table should override this to do it once.
    fn load_with_types(
        &self,
        source: LytafSource,
        range: &TimeRange,
    ) -> Result<(Vec<IntervalRecord>, Vec<EventTypeDef>)> {
        Ok((self.load(source, range)?, self.event_types(source)?))
    }
}

impl<L: CatalogueLoader + ?Sized> CatalogueLoader for Box<L> {
    fn load(&self, source: LytafSource, range: &TimeRange) -> Result<Vec<IntervalRecord>> {
        (**self).load(source, range)
    }

    fn event_types(&self, source: LytafSource) -> Result<Vec<EventTypeDef>> {
        (**self).event_types(source)
    }

    fn load_with_types(
        &self,
        source: LytafSource,
        range: &TimeRange,
    ) -> Result<(Vec<IntervalRecord>, Vec<EventTypeDef>)> {
        (**self).load_with_types(source, range)
    }
}

/// In-memory implementation of catalogue loader
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    tables: HashMap<LytafSource, AnnotationTable>,
}

impl InMemoryLoader {
    /// Create a loader with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the table of a source
    pub fn with_table(mut self, source: LytafSource, table: AnnotationTable) -> Self {
        self.insert(source, table);
        self
    }

    pub fn insert(&mut self, source: LytafSource, table: AnnotationTable) {
        self.tables.insert(source, table);
    }

    fn table(&self, source: LytafSource) -> Result<&AnnotationTable> {
        self.tables
            .get(&source)
            .ok_or_else(|| Error::NotAvailable(format!("No table loaded for source '{}'", source)))
    }
}

impl CatalogueLoader for InMemoryLoader {
    fn load(&self, source: LytafSource, range: &TimeRange) -> Result<Vec<IntervalRecord>> {
        self.table(source)?.records_in(range)
    }

    fn event_types(&self, source: LytafSource) -> Result<Vec<EventTypeDef>> {
        Ok(self.table(source)?.definitions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::table::{EventRow, EventTypeRow};

    fn flare_table() -> AnnotationTable {
        AnnotationTable {
            event_types: vec![EventTypeRow {
                id: 7,
                name: "M Flare".to_string(),
                definition: "M class solar flare.".to_string(),
            }],
            events: vec![EventRow {
                insertion_time: 1371460493,
                begin_time: 1361115900,
                reference_time: 1361116200,
                end_time: 1361116320,
                type_id: 7,
            }],
        }
    }

    #[test]
    fn test_in_memory_load() {
        let loader = InMemoryLoader::new().with_table(LytafSource::Science, flare_table());
        let records = loader
            .load(LytafSource::Science, &TimeRange::unbounded())
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].event_type(), "M Flare");

        let types = loader.event_types(LytafSource::Science).unwrap();
        assert_eq!(types[0].definition, "M class solar flare.");
    }

    #[test]
    fn test_missing_source_is_not_available() {
        let loader: Box<dyn CatalogueLoader> = Box::new(InMemoryLoader::new());
        let err = loader
            .load(LytafSource::Ppt, &TimeRange::unbounded())
            .unwrap_err();
        assert!(matches!(err, Error::NotAvailable(_)));
    }
}
