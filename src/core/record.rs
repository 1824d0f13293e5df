//! Annotation records and the sources they come from

use crate::core::temporal::{TimeRange, Timestamp};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event type code (e.g. `LAR`, `UV occ.`)
pub type EventType = String;

/// One of the four annotation databases published for LYRA
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LytafSource {
    /// Rotation and occultation events
    Lyra,
    /// Manual annotations
    Manual,
    /// Mission-planning events
    Ppt,
    /// Science events
    Science,
}

impl LytafSource {
    /// All sources, in default request order
    pub const ALL: [LytafSource; 4] = [
        LytafSource::Lyra,
        LytafSource::Manual,
        LytafSource::Ppt,
        LytafSource::Science,
    ];

    /// Short name used in file names and on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            LytafSource::Lyra => "lyra",
            LytafSource::Manual => "manual",
            LytafSource::Ppt => "ppt",
            LytafSource::Science => "science",
        }
    }

    /// Name of the published database file
    pub fn db_name(self) -> String {
        format!("annotation_{}.db", self.as_str())
    }

    /// Parse a list of names, failing on the first unknown one
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<LytafSource>> {
        names.iter().map(|n| n.as_ref().parse()).collect()
    }

    pub(crate) fn tag(self) -> u8 {
        match self {
            LytafSource::Lyra => 1,
            LytafSource::Manual => 2,
            LytafSource::Ppt => 3,
            LytafSource::Science => 4,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.tag() == tag)
    }
}

impl fmt::Display for LytafSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LytafSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "lyra" => Ok(LytafSource::Lyra),
            "manual" => Ok(LytafSource::Manual),
            "ppt" => Ok(LytafSource::Ppt),
            "science" => Ok(LytafSource::Science),
            other => Err(Error::UnknownSource(other.to_string())),
        }
    }
}

/// Entry of a source's event-type table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeDef {
    pub name: EventType,
    pub definition: String,
}

/// One annotation event.
///
/// Equality and hashing cover all six fields, which is what the merge
/// deduplicates on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RecordFields")]
pub struct IntervalRecord {
    insertion_time: Timestamp,
    begin_time: Timestamp,
    reference_time: Timestamp,
    end_time: Timestamp,
    event_type: EventType,
    event_definition: String,
}

/// Deserialized form, checked by `IntervalRecord::new`
#[derive(Deserialize)]
struct RecordFields {
    insertion_time: Timestamp,
    begin_time: Timestamp,
    reference_time: Timestamp,
    end_time: Timestamp,
    event_type: EventType,
    event_definition: String,
}

impl TryFrom<RecordFields> for IntervalRecord {
    type Error = Error;

    fn try_from(fields: RecordFields) -> Result<Self> {
        Self::new(
            fields.insertion_time,
            fields.begin_time,
            fields.reference_time,
            fields.end_time,
            fields.event_type,
            fields.event_definition,
        )
    }
}

impl IntervalRecord {
    /// Create a record, rejecting `begin_time > end_time`
    pub fn new(
        insertion_time: Timestamp,
        begin_time: Timestamp,
        reference_time: Timestamp,
        end_time: Timestamp,
        event_type: impl Into<EventType>,
        event_definition: impl Into<String>,
    ) -> Result<Self> {
        let event_type = event_type.into();
        if begin_time > end_time {
            return Err(Error::Temporal(format!(
                "Event '{}' begins at {} after it ends at {}",
                event_type, begin_time, end_time
            )));
        }
        Ok(Self {
            insertion_time,
            begin_time,
            reference_time,
            end_time,
            event_type,
            event_definition: event_definition.into(),
        })
    }

    pub fn insertion_time(&self) -> Timestamp {
        self.insertion_time
    }

    pub fn begin_time(&self) -> Timestamp {
        self.begin_time
    }

    pub fn reference_time(&self) -> Timestamp {
        self.reference_time
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_definition(&self) -> &str {
        &self.event_definition
    }

    /// Closed interval `[begin_time, end_time]`
    pub fn interval(&self) -> TimeRange {
        // begin <= end is checked in `new`
        TimeRange::new_unchecked(self.begin_time, self.end_time)
    }
}

impl fmt::Display for IntervalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} ({})",
            self.event_type,
            self.begin_time.to_isot(),
            self.end_time.to_isot(),
            self.event_definition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lar() -> IntervalRecord {
        IntervalRecord::new(
            Timestamp::from_secs(1371459961),
            Timestamp::from_secs(1359677220),
            Timestamp::from_secs(1359677250),
            Timestamp::from_secs(1359677400),
            "LAR",
            "Large Angle Rotation.",
        )
        .unwrap()
    }

    #[test]
    fn test_record_creation() {
        let record = lar();
        assert_eq!(record.event_type(), "LAR");
        assert_eq!(record.event_definition(), "Large Angle Rotation.");
        assert!(record.interval().contains(Timestamp::from_secs(1359677400)));
    }

    #[test]
    fn test_record_rejects_inverted_interval() {
        let result = IntervalRecord::new(
            Timestamp::from_secs(0),
            Timestamp::from_secs(20),
            Timestamp::from_secs(15),
            Timestamp::from_secs(10),
            "LAR",
            "Large Angle Rotation.",
        );
        assert!(matches!(result, Err(Error::Temporal(_))));
    }

    #[test]
    fn test_record_interval_bounds() {
        let interval = lar().interval();
        assert_eq!(interval.start(), Timestamp::from_secs(1359677220));
        assert_eq!(interval.end(), Timestamp::from_secs(1359677400));
        assert!(!interval.contains(Timestamp::from_secs(1359677401)));
    }

    #[test]
    fn test_deserialize_checks_interval() {
        let json = serde_json::to_string(&lar()).unwrap();
        assert_eq!(serde_json::from_str::<IntervalRecord>(&json).unwrap(), lar());

        let inverted = serde_json::json!({
            "insertion_time": 0,
            "begin_time": 20_000_000_000i64,
            "reference_time": 15_000_000_000i64,
            "end_time": 10_000_000_000i64,
            "event_type": "LAR",
            "event_definition": "",
        });
        assert!(serde_json::from_value::<IntervalRecord>(inverted).is_err());
    }

    #[test]
    fn test_source_names() {
        assert_eq!("ppt".parse::<LytafSource>().unwrap(), LytafSource::Ppt);
        assert_eq!(LytafSource::Science.db_name(), "annotation_science.db");
        assert!(matches!(
            "gigo".parse::<LytafSource>(),
            Err(Error::UnknownSource(name)) if name == "gigo"
        ));
        assert!(LytafSource::parse_list(&["lyra", "gigo"]).is_err());
        for source in LytafSource::ALL {
            assert_eq!(LytafSource::from_tag(source.tag()), Some(source));
        }
    }
}
