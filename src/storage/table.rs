//! Raw annotation tables as published in the LYTAF databases

use crate::core::record::{EventTypeDef, IntervalRecord};
use crate::core::temporal::{TimeRange, Timestamp};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Row of the `eventType` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTypeRow {
    pub id: i64,
    #[serde(rename = "type")]
    pub name: String,
    pub definition: String,
}

/// Row of the `event` table. Times are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRow {
    pub insertion_time: i64,
    pub begin_time: i64,
    pub reference_time: i64,
    pub end_time: i64,
    #[serde(rename = "type")]
    pub type_id: i64,
}

/// Contents of one annotation database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationTable {
    #[serde(default)]
    pub event_types: Vec<EventTypeRow>,
    #[serde(default)]
    pub events: Vec<EventRow>,
}

impl AnnotationTable {
    /// Parse the JSON export of a database
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Event-type definitions in table order
    pub fn definitions(&self) -> Vec<EventTypeDef> {
        self.event_types
            .iter()
            .map(|row| EventTypeDef {
                name: row.name.clone(),
                definition: row.definition.clone(),
            })
            .collect()
    }

    /// Join events with their type rows, keeping events whose closed
    /// interval overlaps `range`. Row order is preserved.
    pub fn records_in(&self, range: &TimeRange) -> Result<Vec<IntervalRecord>> {
        let types: HashMap<i64, &EventTypeRow> =
            self.event_types.iter().map(|t| (t.id, t)).collect();

        let mut records = Vec::new();
        for row in &self.events {
            let begin = Timestamp::try_from_secs(row.begin_time)?;
            let end = Timestamp::try_from_secs(row.end_time)?;
            if begin > range.end() || end < range.start() {
                continue;
            }
            let event_type = types.get(&row.type_id).ok_or_else(|| {
                Error::Storage(format!(
                    "Event beginning at {} references unknown type id {}",
                    begin, row.type_id
                ))
            })?;
            records.push(IntervalRecord::new(
                Timestamp::try_from_secs(row.insertion_time)?,
                begin,
                Timestamp::try_from_secs(row.reference_time)?,
                end,
                event_type.name.clone(),
                event_type.definition.clone(),
            )?);
        }
        Ok(records)
    }
}
