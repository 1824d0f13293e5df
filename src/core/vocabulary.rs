//! Event-type vocabulary: numeric LYRA codes and known type names

use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Fixed LYRA event-type table. Code `n` maps to `LYRA_EVENT_TYPES[n - 1]`.
pub const LYRA_EVENT_TYPES: [&str; 11] = [
    "LAR",
    "N/A",
    "UV occult.",
    "Vis. occult.",
    "Offpoint",
    "SAA",
    "Auroral zone",
    "Moon in LYRA",
    "Moon in SWAP",
    "Venus in LYRA",
    "Venus in SWAP",
];

/// Translate numeric codes to names, skipping codes without a name.
///
/// `translate(&[1])` is `["LAR"]`; code 0 and codes above 11 are dropped.
pub fn translate(codes: &[i64]) -> Vec<&'static str> {
    codes.iter().filter_map(|c| code_name(*c)).collect()
}

fn code_name(code: i64) -> Option<&'static str> {
    usize::try_from(code)
        .ok()
        .and_then(|c| c.checked_sub(1))
        .and_then(|i| LYRA_EVENT_TYPES.get(i).copied())
}

/// Names an artifact selector may refer to.
///
/// Always contains the fixed LYRA table; callers register the event types
/// read from the annotation databases on top.
#[derive(Debug, Clone, Default)]
pub struct EventVocabulary {
    extra: BTreeSet<String>,
}

impl EventVocabulary {
    /// Vocabulary with only the fixed LYRA table
    pub fn lyra() -> Self {
        Self::default()
    }

    /// Register additional known event-type names
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(names);
        self
    }

    pub fn register<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra.extend(names.into_iter().map(Into::into));
    }

    /// Strict code lookup
    pub fn name_for(&self, code: i64) -> Result<&'static str> {
        code_name(code).ok_or_else(|| {
            Error::InvalidArtifact(format!(
                "Event code {} is outside the valid range 1..={}",
                code,
                LYRA_EVENT_TYPES.len()
            ))
        })
    }

    /// Whether `name` is a known event type
    pub fn contains(&self, name: &str) -> bool {
        LYRA_EVENT_TYPES.contains(&name) || self.extra.contains(name)
    }

    /// Every known name: the fixed table first, then registered names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = LYRA_EVENT_TYPES.to_vec();
        names.extend(
            self.extra
                .iter()
                .map(String::as_str)
                .filter(|n| !LYRA_EVENT_TYPES.contains(n)),
        );
        names
    }
}
