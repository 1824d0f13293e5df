//! Catalogue merger: combine several annotation sources into one catalogue

use crate::core::catalogue::IntervalCatalogue;
use crate::core::record::LytafSource;
use crate::core::temporal::TimeRange;
use crate::core::vocabulary::EventVocabulary;
use crate::error::Result;
use crate::storage::CatalogueLoader;
use tracing::debug;

/// Merges the records of several sources through a loader
pub struct CatalogueMerger<'a> {
    loader: &'a dyn CatalogueLoader,
}

impl<'a> CatalogueMerger<'a> {
    pub fn new(loader: &'a dyn CatalogueLoader) -> Self {
        Self { loader }
    }

    /// Merge `sources` for `range`.
    ///
    /// An empty source list means all four sources. Exact duplicates are
    /// dropped, keeping the first occurrence in source order, and the result
    /// is sorted by insertion time.
    pub fn merge(&self, sources: &[LytafSource], range: &TimeRange) -> Result<IntervalCatalogue> {
        self.merge_with(sources, range, None)
    }

    /// `merge`, also registering every event type of the merged sources with
    /// `vocabulary`. Each source is read once.
    pub fn merge_registering(
        &self,
        sources: &[LytafSource],
        range: &TimeRange,
        vocabulary: &mut EventVocabulary,
    ) -> Result<IntervalCatalogue> {
        self.merge_with(sources, range, Some(vocabulary))
    }

    fn merge_with(
        &self,
        sources: &[LytafSource],
        range: &TimeRange,
        mut vocabulary: Option<&mut EventVocabulary>,
    ) -> Result<IntervalCatalogue> {
        let mut catalogue = IntervalCatalogue::new();
        for source in normalize_sources(sources) {
            let records = match vocabulary.as_deref_mut() {
                Some(vocabulary) => {
                    let (records, types) = self.loader.load_with_types(source, range)?;
                    vocabulary.register(types.into_iter().map(|t| t.name));
                    records
                }
                None => self.loader.load(source, range)?,
            };
            let loaded = records.len();
            let added = catalogue.append_unique(records);
            debug!(
                source = %source,
                loaded,
                duplicates = loaded - added,
                "merged annotation source"
            );
        }
        catalogue.sort_by_insertion();
        Ok(catalogue)
    }

    /// Merge sources given by name; unknown names fail before anything loads
    pub fn merge_named<S: AsRef<str>>(&self, names: &[S], range: &TimeRange) -> Result<IntervalCatalogue> {
        let sources = LytafSource::parse_list(names)?;
        self.merge(&sources, range)
    }
}

/// Sources in request order with repeats removed; empty means all
pub fn normalize_sources(sources: &[LytafSource]) -> Vec<LytafSource> {
    if sources.is_empty() {
        return LytafSource::ALL.to_vec();
    }
    let mut unique = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique.contains(source) {
            unique.push(*source);
        }
    }
    unique
}
