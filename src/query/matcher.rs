//! Resolve an artifact selector against a catalogue

use crate::core::catalogue::IntervalCatalogue;
use crate::core::vocabulary::EventVocabulary;
use crate::error::{Error, Result};
use crate::query::selector::{ArtifactCode, ArtifactSelector};

/// Outcome of matching a selector against a catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// One flag per catalogue record
    pub mask: Vec<bool>,
    /// Requested event-type names after code translation, in request order
    pub requested: Vec<String>,
    /// Requested names with no matching record, in request order
    pub not_found: Vec<String>,
}

impl Resolution {
    fn empty(len: usize) -> Self {
        Self {
            mask: vec![false; len],
            requested: Vec::new(),
            not_found: Vec::new(),
        }
    }

    /// Names were requested and none of them matched
    pub fn nothing_found(&self) -> bool {
        !self.requested.is_empty() && self.not_found.len() == self.requested.len()
    }

    /// Number of matched records
    pub fn matched(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }
}

/// Resolves selectors using a vocabulary of known event types
pub struct ArtifactMatcher<'a> {
    vocabulary: &'a EventVocabulary,
}

impl<'a> ArtifactMatcher<'a> {
    pub fn new(vocabulary: &'a EventVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Checks that need no catalogue: a selector is present and every
    /// integer code lies in the fixed vocabulary. Names are checked by
    /// `resolve`, since a catalogue can make them known.
    pub fn check_selector(&self, selector: Option<&ArtifactSelector>) -> Result<()> {
        let codes = match selector {
            Some(ArtifactSelector::All) => return Ok(()),
            Some(ArtifactSelector::Codes(codes)) if !codes.is_empty() => codes,
            _ => {
                return Err(Error::InvalidArtifact(
                    "No artifacts supplied to remove".to_string(),
                ))
            }
        };
        for code in codes {
            if let ArtifactCode::Index(code) = code {
                self.vocabulary.name_for(*code)?;
            }
        }
        Ok(())
    }

    /// Translate codes to names and check every name is known.
    /// Names present in `catalogue` count as known.
    pub fn validate(&self, codes: &[ArtifactCode], catalogue: &IntervalCatalogue) -> Result<Vec<String>> {
        codes
            .iter()
            .map(|code| {
                let name = match code {
                    ArtifactCode::Index(code) => self.vocabulary.name_for(*code)?.to_string(),
                    ArtifactCode::Name(name) => name.clone(),
                };
                if self.vocabulary.contains(&name) || catalogue.has_event_type(&name) {
                    Ok(name)
                } else {
                    Err(Error::InvalidArtifact(format!(
                        "'{}' is not a valid artifact type; known types: {}",
                        name,
                        self.vocabulary.names().join(", ")
                    )))
                }
            })
            .collect()
    }

    /// Match `selector` against `catalogue`.
    ///
    /// A missing or empty selector is an error unless the catalogue is empty,
    /// in which case nothing is matched.
    pub fn resolve(
        &self,
        catalogue: &IntervalCatalogue,
        selector: Option<&ArtifactSelector>,
    ) -> Result<Resolution> {
        let codes = match selector {
            Some(ArtifactSelector::All) => {
                return Ok(Resolution {
                    mask: vec![true; catalogue.len()],
                    requested: Vec::new(),
                    not_found: Vec::new(),
                })
            }
            Some(ArtifactSelector::Codes(codes)) if !codes.is_empty() => codes,
            _ if catalogue.is_empty() => return Ok(Resolution::empty(0)),
            _ => {
                return Err(Error::InvalidArtifact(
                    "No artifacts supplied to remove".to_string(),
                ))
            }
        };

        let requested = self.validate(codes, catalogue)?;

        let mut mask = vec![false; catalogue.len()];
        let mut not_found = Vec::new();
        for name in &requested {
            let mut hits = 0;
            for (flag, record) in mask.iter_mut().zip(catalogue.iter()) {
                if record.event_type() == name {
                    *flag = true;
                    hits += 1;
                }
            }
            if hits == 0 {
                not_found.push(name.clone());
            }
        }

        Ok(Resolution {
            mask,
            requested,
            not_found,
        })
    }
}
