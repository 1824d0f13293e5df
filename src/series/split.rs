//! Splitting a series into artifact-free segments

use crate::core::catalogue::IntervalCatalogue;
use crate::core::temporal::{TimeRange, Timestamp};
use crate::error::{Error, Result};
use crate::series::filter::sample_mask;
use serde::Serialize;
use tracing::{debug, info};

/// A maximal run of consecutive unmasked samples
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub subtimes: Vec<Timestamp>,
    pub subdata: Vec<f64>,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.subtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtimes.is_empty()
    }

    /// First to last sample time
    pub fn span(&self) -> Result<TimeRange> {
        TimeRange::spanning(&self.subtimes)
    }
}

/// Split `time`/`data` at every sample covered by a catalogue record.
///
/// Masked samples separate segments and belong to none of them. Segments
/// are returned in index order.
pub fn split_series(
    time: &[Timestamp],
    data: &[f64],
    catalogue: &IntervalCatalogue,
) -> Result<Vec<Segment>> {
    if data.len() != time.len() {
        return Err(Error::ChannelShape(format!(
            "data has {} values but the time axis has {}",
            data.len(),
            time.len()
        )));
    }
    if time.is_empty() {
        return Ok(Vec::new());
    }

    let (mask, _) = sample_mask(time, catalogue, &vec![true; catalogue.len()]);
    if !mask.iter().any(|m| *m) {
        info!("No artifacts found in time series; returning a single segment");
        return Ok(vec![Segment {
            subtimes: time.to_vec(),
            subdata: data.to_vec(),
        }]);
    }

    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, masked) in mask.iter().chain(std::iter::once(&true)).enumerate() {
        match (run_start, *masked) {
            (None, false) => run_start = Some(i),
            (Some(start), true) => {
                segments.push(Segment {
                    subtimes: time[start..i].to_vec(),
                    subdata: data[start..i].to_vec(),
                });
                run_start = None;
            }
            _ => {}
        }
    }

    debug!(segments = segments.len(), "Split time series");
    Ok(segments)
}
