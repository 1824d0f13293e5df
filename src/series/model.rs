//! Named-channel time series

use crate::core::temporal::Timestamp;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// One named data column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedChannel {
    pub name: String,
    pub values: Vec<f64>,
}

impl NamedChannel {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Deserialize)]
struct RawSeries {
    time: Vec<String>,
    #[serde(default)]
    channels: Vec<NamedChannel>,
}

/// A time axis with zero or more aligned channels
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LyraSeries {
    time: Vec<Timestamp>,
    channels: Vec<NamedChannel>,
}

impl LyraSeries {
    pub fn new(time: Vec<Timestamp>) -> Self {
        Self {
            time,
            channels: Vec::new(),
        }
    }

    /// Add a channel, which must be as long as the time axis
    pub fn with_channel(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let channel = NamedChannel::new(name, values);
        if channel.values.len() != self.time.len() {
            return Err(Error::ChannelShape(format!(
                "channel '{}' has {} values but the time axis has {}",
                channel.name,
                channel.values.len(),
                self.time.len()
            )));
        }
        self.channels.push(channel);
        Ok(self)
    }

    /// Read `{"time": [iso, ..], "channels": [{"name": .., "values": [..]}]}`
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: RawSeries = serde_json::from_reader(reader)?;
        let time = raw
            .time
            .iter()
            .map(|t| t.parse())
            .collect::<Result<Vec<Timestamp>>>()?;
        raw.channels
            .into_iter()
            .try_fold(Self::new(time), |series, channel| {
                series.with_channel(channel.name, channel.values)
            })
    }

    pub fn time(&self) -> &[Timestamp] {
        &self.time
    }

    pub fn channels(&self) -> &[NamedChannel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&NamedChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// Channel values without their names
    pub fn channel_values(&self) -> Vec<Vec<f64>> {
        self.channels.iter().map(|c| c.values.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}
