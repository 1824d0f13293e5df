//! CSV export of series and catalogues

use crate::core::catalogue::IntervalCatalogue;
use crate::core::temporal::Timestamp;
use crate::error::{Error, Result};
use crate::series::filter::check_channels;
use std::io::Write;

/// Column headers of `write_catalogue_csv`
pub const CATALOGUE_COLUMNS: [&str; 6] = [
    "insertion_time",
    "begin_time",
    "reference_time",
    "end_time",
    "event_type",
    "event_definition",
];

/// ISO time strings plus the column names for a series export.
///
/// Default names are `time, channel0, channel1, ..`. Given names must
/// number one more than the channels.
pub fn prep_columns(
    time: &[Timestamp],
    channels: Option<&[Vec<f64>]>,
    filecolumns: Option<&[String]>,
) -> Result<(Vec<String>, Vec<String>)> {
    let string_time: Vec<String> = time.iter().map(Timestamp::to_isot).collect();

    let columns = match (channels, filecolumns) {
        (None, Some(_)) => {
            return Err(Error::Export(
                "Column names given but no channels supplied".to_string(),
            ))
        }
        (None, None) => vec!["time".to_string()],
        (Some(channels), None) => std::iter::once("time".to_string())
            .chain((0..channels.len()).map(|i| format!("channel{}", i)))
            .collect(),
        (Some(channels), Some(names)) => {
            if names.len() != channels.len() + 1 {
                return Err(Error::Export(format!(
                    "{} column names given for a time column and {} channels",
                    names.len(),
                    channels.len()
                )));
            }
            names.to_vec()
        }
    };

    Ok((string_time, columns))
}

/// Write `time` and its channels as CSV, one row per sample
pub fn write_series_csv<W: Write>(
    writer: W,
    time: &[Timestamp],
    channels: Option<&[Vec<f64>]>,
    filecolumns: Option<&[String]>,
) -> Result<()> {
    if let Some(channels) = channels {
        check_channels(time, channels)?;
    }
    let (string_time, columns) = prep_columns(time, channels, filecolumns)?;

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&columns)?;
    for (i, t) in string_time.iter().enumerate() {
        let mut row = vec![t.clone()];
        if let Some(channels) = channels {
            row.extend(channels.iter().map(|c| c[i].to_string()));
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write every record of `catalogue` as CSV with ISO timestamps
pub fn write_catalogue_csv<W: Write>(writer: W, catalogue: &IntervalCatalogue) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CATALOGUE_COLUMNS)?;
    for record in catalogue {
        wtr.write_record([
            record.insertion_time().to_isot(),
            record.begin_time().to_isot(),
            record.reference_time().to_isot(),
            record.end_time().to_isot(),
            record.event_type().to_string(),
            record.event_definition().to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
