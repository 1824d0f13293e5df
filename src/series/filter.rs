//! Removal of artifact periods from a time series

use crate::core::catalogue::IntervalCatalogue;
use crate::core::temporal::Timestamp;
use crate::core::vocabulary::EventVocabulary;
use crate::error::{Error, Result};
use crate::index::TimeIndex;
use crate::query::{ArtifactMatcher, ArtifactSelector};
use crate::series::report::ArtifactStatusReport;
use serde::Serialize;
use tracing::{debug, warn};

/// Filter options
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// Build an `ArtifactStatusReport`
    pub return_report: bool,
}

impl FilterOptions {
    pub fn with_report() -> Self {
        Self {
            return_report: true,
        }
    }
}

/// Non-fatal conditions raised while filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterWarning {
    /// None of the requested artifacts occur in the catalogue
    NothingFound,
}

/// Filtered series plus optional report
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutput {
    pub time: Vec<Timestamp>,
    /// Present iff channels were supplied
    pub channels: Option<Vec<Vec<f64>>>,
    /// Present iff a report was requested
    pub report: Option<ArtifactStatusReport>,
    pub warning: Option<FilterWarning>,
    /// Number of samples dropped
    pub removed_samples: usize,
}

/// Check every channel is as long as `time`
pub fn check_channels(time: &[Timestamp], channels: &[Vec<f64>]) -> Result<()> {
    for (i, channel) in channels.iter().enumerate() {
        if channel.len() != time.len() {
            return Err(Error::ChannelShape(format!(
                "channel {} has {} values but the time axis has {}",
                i,
                channel.len(),
                time.len()
            )));
        }
    }
    Ok(())
}

/// Mask every sample inside any of `catalogue`'s records where `records` is
/// set. Returns the sample mask and, per record, whether it covered a sample.
pub(crate) fn sample_mask(
    time: &[Timestamp],
    catalogue: &IntervalCatalogue,
    records: &[bool],
) -> (Vec<bool>, Vec<bool>) {
    let index = TimeIndex::new(time);
    let mut mask = vec![false; time.len()];
    let mut touched = vec![false; catalogue.len()];
    for ((record, selected), hit) in catalogue.iter().zip(records).zip(touched.iter_mut()) {
        if *selected {
            *hit = index.mark(&record.interval(), &mut mask) > 0;
        }
    }
    (mask, touched)
}

/// Keep the entries of `values` whose mask entry is unset
pub(crate) fn retain_unmasked<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, masked)| !**masked)
        .map(|(v, _)| v.clone())
        .collect()
}

/// Remove the samples falling inside the selected artifact periods.
///
/// Intervals are closed: a sample equal to a record's begin or end time is
/// removed. Validation of `channels` and `selector` completes before any
/// sample is inspected.
pub fn remove_events(
    time: &[Timestamp],
    channels: Option<&[Vec<f64>]>,
    catalogue: &IntervalCatalogue,
    selector: Option<&ArtifactSelector>,
    vocabulary: &EventVocabulary,
    options: FilterOptions,
) -> Result<FilterOutput> {
    if let Some(channels) = channels {
        check_channels(time, channels)?;
    }

    let resolution = ArtifactMatcher::new(vocabulary).resolve(catalogue, selector)?;

    if resolution.nothing_found() {
        warn!(
            requested = ?resolution.requested,
            "None of the artifact types requested were found in the catalogue; time series not altered"
        );
        let report = options.return_report.then(|| {
            ArtifactStatusReport::new(
                catalogue.clone(),
                &vec![false; catalogue.len()],
                resolution.not_found.clone(),
            )
        });
        return Ok(FilterOutput {
            time: time.to_vec(),
            channels: channels.map(<[Vec<f64>]>::to_vec),
            report,
            warning: Some(FilterWarning::NothingFound),
            removed_samples: 0,
        });
    }

    let (mask, touched) = sample_mask(time, catalogue, &resolution.mask);
    let removed_samples = mask.iter().filter(|m| **m).count();
    debug!(
        matched = resolution.matched(),
        removed_samples,
        "Applied artifact mask"
    );

    let report = options.return_report.then(|| {
        ArtifactStatusReport::new(catalogue.clone(), &touched, resolution.not_found.clone())
    });

    Ok(FilterOutput {
        time: retain_unmasked(time, &mask),
        channels: channels.map(|channels| {
            channels
                .iter()
                .map(|channel| retain_unmasked(channel, &mask))
                .collect()
        }),
        report,
        warning: None,
        removed_samples,
    })
}
