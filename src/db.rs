//! Main engine implementation

use crate::config::LytafConfig;
use crate::core::catalogue::IntervalCatalogue;
use crate::core::merge::{normalize_sources, CatalogueMerger};
use crate::core::record::{EventTypeDef, LytafSource};
use crate::core::temporal::{TimeRange, Timestamp};
use crate::core::vocabulary::EventVocabulary;
use crate::error::{Error, Result};
use crate::query::{ArtifactMatcher, ArtifactSelector};
use crate::series::{
    self, check_channels, ArtifactStatusReport, FilterOptions, FilterOutput, FilterWarning,
    LyraSeries, Segment,
};
use crate::storage::{AnnotationStore, CatalogueLoader, InMemoryLoader};
use tracing::debug;

/// Result of filtering a `LyraSeries`
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredSeries {
    pub series: LyraSeries,
    pub report: Option<ArtifactStatusReport>,
    pub warning: Option<FilterWarning>,
    pub removed_samples: usize,
}

/// LYTAF engine: merges annotation sources and applies them to series
pub struct LytafDB {
    /// Source of annotation records
    loader: Box<dyn CatalogueLoader>,
    /// Sources used when a call names none
    default_sources: Vec<LytafSource>,
}

impl LytafDB {
    /// Create an engine over any loader
    pub fn new<L: CatalogueLoader + 'static>(loader: L) -> Self {
        Self {
            loader: Box::new(loader),
            default_sources: LytafSource::ALL.to_vec(),
        }
    }

    /// Create an engine over an in-memory loader
    pub fn in_memory(loader: InMemoryLoader) -> Self {
        Self::new(loader)
    }

    /// Open the on-disk store described by `config`
    pub fn open(config: &LytafConfig) -> Result<Self> {
        config.validate()?;
        let store = AnnotationStore::open(&config.data_dir)?.with_policy(config.cache_policy);
        Ok(Self::new(store).with_default_sources(&config.default_sources))
    }

    /// Replace the default sources; an empty list means all four
    pub fn with_default_sources(mut self, sources: &[LytafSource]) -> Self {
        self.default_sources = normalize_sources(sources);
        self
    }

    pub fn default_sources(&self) -> &[LytafSource] {
        &self.default_sources
    }

    pub fn loader(&self) -> &dyn CatalogueLoader {
        self.loader.as_ref()
    }

    fn sources_or_default<'a>(&'a self, sources: &'a [LytafSource]) -> &'a [LytafSource] {
        if sources.is_empty() {
            self.default_sources.as_slice()
        } else {
            sources
        }
    }

    /// Merged records of `sources` overlapping `range`
    #[tracing::instrument(skip_all, fields(range = %range))]
    pub fn get_events(&self, range: &TimeRange, sources: &[LytafSource]) -> Result<IntervalCatalogue> {
        CatalogueMerger::new(self.loader.as_ref()).merge(self.sources_or_default(sources), range)
    }

    /// Event-type table of each source
    pub fn event_types(&self, sources: &[LytafSource]) -> Result<Vec<(LytafSource, Vec<EventTypeDef>)>> {
        normalize_sources(self.sources_or_default(sources))
            .into_iter()
            .map(|source| Ok((source, self.loader.event_types(source)?)))
            .collect()
    }

    /// Remove the selected artifact periods from `time` and `channels`.
    ///
    /// The selector is checked before any source is read. The catalogue
    /// covers the series' own time range, and the event types of the merged
    /// sources count as known names.
    #[tracing::instrument(skip_all, fields(samples = time.len()))]
    pub fn remove_events(
        &self,
        time: &[Timestamp],
        channels: Option<&[Vec<f64>]>,
        selector: Option<&ArtifactSelector>,
        sources: &[LytafSource],
        options: FilterOptions,
    ) -> Result<FilterOutput> {
        if let Some(channels) = channels {
            check_channels(time, channels)?;
        }
        let mut vocabulary = EventVocabulary::lyra();
        ArtifactMatcher::new(&vocabulary).check_selector(selector)?;

        let range = TimeRange::spanning(time)?;
        let catalogue = CatalogueMerger::new(self.loader.as_ref()).merge_registering(
            self.sources_or_default(sources),
            &range,
            &mut vocabulary,
        )?;
        debug!(records = catalogue.len(), "merged catalogue for series range");
        series::remove_events(time, channels, &catalogue, selector, &vocabulary, options)
    }

    /// `remove_events` over a named-channel series
    pub fn remove_events_from_series(
        &self,
        input: &LyraSeries,
        selector: Option<&ArtifactSelector>,
        sources: &[LytafSource],
        options: FilterOptions,
    ) -> Result<FilteredSeries> {
        let values = input.channel_values();
        let output = self.remove_events(
            input.time(),
            Some(values.as_slice()),
            selector,
            sources,
            options,
        )?;

        let channels = output.channels.unwrap_or_default();
        let series = input
            .channel_names()
            .into_iter()
            .zip(channels)
            .try_fold(LyraSeries::new(output.time), |series, (name, values)| {
                series.with_channel(name, values)
            })?;

        Ok(FilteredSeries {
            series,
            report: output.report,
            warning: output.warning,
            removed_samples: output.removed_samples,
        })
    }

    /// Split `time`/`data` at every artifact period of `sources`
    #[tracing::instrument(skip_all, fields(samples = time.len()))]
    pub fn split_series(
        &self,
        time: &[Timestamp],
        data: &[f64],
        sources: &[LytafSource],
    ) -> Result<Vec<Segment>> {
        if data.len() != time.len() {
            return Err(Error::ChannelShape(format!(
                "data has {} values but the time axis has {}",
                data.len(),
                time.len()
            )));
        }
        let range = TimeRange::spanning(time)?;
        let catalogue = self.get_events(&range, sources)?;
        series::split_series(time, data, &catalogue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{AnnotationTable, EventRow, EventTypeRow};

    const START: i64 = 1359676800;

    fn lyra_table() -> AnnotationTable {
        AnnotationTable {
            event_types: vec![
                EventTypeRow {
                    id: 1,
                    name: "LAR".to_string(),
                    definition: "Large Angle Rotation.".to_string(),
                },
                EventTypeRow {
                    id: 2,
                    name: "UV occ.".to_string(),
                    definition: "Occultation in the UV spectrum.".to_string(),
                },
            ],
            events: vec![
                EventRow {
                    insertion_time: 1371459961,
                    begin_time: 1359677220,
                    reference_time: 1359677250,
                    end_time: 1359677400,
                    type_id: 1,
                },
                EventRow {
                    insertion_time: 1371460063,
                    begin_time: 1359681764,
                    reference_time: 1359682450,
                    end_time: 1359683136,
                    type_id: 2,
                },
            ],
        }
    }

    fn manual_table() -> AnnotationTable {
        AnnotationTable {
            event_types: vec![EventTypeRow {
                id: 1,
                name: "Calibration".to_string(),
                definition: "Manual calibration.".to_string(),
            }],
            events: vec![EventRow {
                insertion_time: 1371459961,
                begin_time: START + 3000,
                reference_time: START + 3000,
                end_time: START + 3060,
                type_id: 1,
            }],
        }
    }

    fn db() -> LytafDB {
        LytafDB::in_memory(
            InMemoryLoader::new()
                .with_table(LytafSource::Lyra, lyra_table())
                .with_table(LytafSource::Manual, manual_table()),
        )
        .with_default_sources(&[LytafSource::Lyra, LytafSource::Manual])
    }

    fn minutes(n: i64) -> Vec<Timestamp> {
        (0..n).map(|i| Timestamp::from_secs(START + 60 * i)).collect()
    }

    #[test]
    fn test_get_events_defaults() {
        let range = TimeRange::spanning(&minutes(120)).unwrap();
        let catalogue = db().get_events(&range, &[]).unwrap();
        // LAR and Calibration share an insertion time and keep source order
        assert_eq!(catalogue.event_types(), vec!["LAR", "Calibration", "UV occ."]);

        let lyra_only = db().get_events(&range, &[LytafSource::Lyra]).unwrap();
        assert_eq!(lyra_only.len(), 2);
    }

    #[test]
    fn test_unavailable_source_fails_merge() {
        let range = TimeRange::spanning(&minutes(10)).unwrap();
        let err = db().get_events(&range, &[LytafSource::Ppt]).unwrap_err();
        assert!(matches!(err, Error::NotAvailable(_)));
    }

    #[test]
    fn test_known_names_come_from_requested_sources() {
        let time = minutes(120);
        let selector = ArtifactSelector::from("Calibration");

        let out = db()
            .remove_events(&time, None, Some(&selector), &[], FilterOptions::default())
            .unwrap();
        assert_eq!(out.removed_samples, 2);

        // manual is not requested, so its event types are unknown
        let err = db()
            .remove_events(
                &time,
                None,
                Some(&selector),
                &[LytafSource::Lyra],
                FilterOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArtifact(_)));
    }

    #[test]
    fn test_selector_checked_before_loading() {
        // ppt has no table, so any load would fail with NotAvailable
        let time = minutes(10);
        for selector in [None, Some(ArtifactSelector::from(12i64))] {
            let err = db()
                .remove_events(
                    &time,
                    None,
                    selector.as_ref(),
                    &[LytafSource::Ppt],
                    FilterOptions::default(),
                )
                .unwrap_err();
            assert!(matches!(err, Error::InvalidArtifact(_)), "{:?}", err);
        }

        let err = db()
            .remove_events(
                &time,
                None,
                Some(&ArtifactSelector::from(1i64)),
                &[LytafSource::Ppt],
                FilterOptions::default(),
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotAvailable(_)));
    }

    #[test]
    fn test_remove_events_from_series() {
        let time = minutes(120);
        let input = LyraSeries::new(time.clone())
            .with_channel("CHANNEL1", vec![1.0; 120])
            .unwrap()
            .with_channel("CHANNEL2", vec![2.0; 120])
            .unwrap();
        let selector = ArtifactSelector::from(vec!["LAR", "Calibration"]);

        let out = db()
            .remove_events_from_series(&input, Some(&selector), &[], FilterOptions::with_report())
            .unwrap();

        // LAR covers minutes 7..=10, Calibration minutes 50..=51
        assert_eq!(out.removed_samples, 6);
        assert_eq!(out.series.len(), 114);
        assert_eq!(out.series.channel_names(), vec!["CHANNEL1", "CHANNEL2"]);
        assert_eq!(out.report.unwrap().removed.len(), 2);
    }

    #[test]
    fn test_registered_type_not_in_range_is_not_found() {
        // Calibration is registered but lies outside a five-minute series
        let out = db()
            .remove_events(
                &minutes(5),
                None,
                Some(&ArtifactSelector::from("Calibration")),
                &[],
                FilterOptions::with_report(),
            )
            .unwrap();
        assert_eq!(out.warning, Some(FilterWarning::NothingFound));
        assert_eq!(out.report.unwrap().not_found, vec!["Calibration".to_string()]);
    }

    #[test]
    fn test_empty_series_is_temporal_error() {
        let err = db()
            .remove_events(&[], None, Some(&ArtifactSelector::All), &[], FilterOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Temporal(_)));

        let err = db().split_series(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, Error::Temporal(_)));
    }

    #[test]
    fn test_split_series() {
        let time = minutes(60);
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let segments = db().split_series(&time, &data, &[]).unwrap();
        // gaps at minutes 7..=10 and 50..=51
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 7);
        assert_eq!(segments[1].len(), 39);
        assert_eq!(segments[2].len(), 8);
    }
}
