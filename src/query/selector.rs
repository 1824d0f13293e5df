//! Artifact selectors and their text / JSON forms

use crate::error::{Error, Result};
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map},
    multi::separated_list1,
    sequence::delimited,
    IResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// One requested artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactCode {
    /// Numeric code into the LYRA event-type table
    Index(i64),
    /// Event-type name, e.g. `LAR`
    Name(String),
}

impl fmt::Display for ArtifactCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactCode::Index(code) => write!(f, "{}", code),
            ArtifactCode::Name(name) => f.write_str(name),
        }
    }
}

impl From<&str> for ArtifactCode {
    fn from(name: &str) -> Self {
        ArtifactCode::Name(name.to_string())
    }
}

impl From<String> for ArtifactCode {
    fn from(name: String) -> Self {
        ArtifactCode::Name(name)
    }
}

impl From<i64> for ArtifactCode {
    fn from(code: i64) -> Self {
        ArtifactCode::Index(code)
    }
}

impl TryFrom<&JsonValue> for ArtifactCode {
    type Error = Error;

    fn try_from(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::String(name) => Ok(ArtifactCode::Name(name.clone())),
            JsonValue::Number(n) => n.as_i64().map(ArtifactCode::Index).ok_or_else(|| {
                Error::InvalidSelectorType(format!("artifact code {} is not an integer", n))
            }),
            other => Err(Error::InvalidSelectorType(format!(
                "artifact entries must be names or integer codes, got {}",
                other
            ))),
        }
    }
}

/// Which artifacts to act on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactSelector {
    /// Every record in the catalogue
    All,
    /// The listed codes, in request order
    Codes(Vec<ArtifactCode>),
}

impl ArtifactSelector {
    /// Parse the comma-separated text form.
    ///
    /// Entries are integer codes, bare names or quoted names
    /// (`LAR, 'UV occ.', 5`). `*` or `all` alone selects everything.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(ArtifactSelector::Codes(Vec::new()));
        }
        if trimmed == "*" || trimmed.eq_ignore_ascii_case("all") {
            return Ok(ArtifactSelector::All);
        }

        let (_, tokens) = entries(trimmed).map_err(|e| {
            Error::InvalidSelectorType(format!("malformed artifact list '{}': {}", trimmed, e))
        })?;
        tokens
            .into_iter()
            .map(Token::into_code)
            .collect::<Result<Vec<_>>>()
            .map(ArtifactSelector::Codes)
    }

    /// Build from a JSON value: a name, an integer code, or an array of them
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Null => Ok(ArtifactSelector::Codes(Vec::new())),
            JsonValue::Array(items) => items
                .iter()
                .map(ArtifactCode::try_from)
                .collect::<Result<Vec<_>>>()
                .map(ArtifactSelector::Codes),
            scalar => Ok(ArtifactSelector::Codes(vec![ArtifactCode::try_from(scalar)?])),
        }
    }

    /// Whether nothing was requested
    pub fn is_empty(&self) -> bool {
        matches!(self, ArtifactSelector::Codes(codes) if codes.is_empty())
    }
}

impl FromStr for ArtifactSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ArtifactSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactSelector::All => f.write_str("*"),
            ArtifactSelector::Codes(codes) => {
                let parts: Vec<String> = codes.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl<T: Into<ArtifactCode>> From<Vec<T>> for ArtifactSelector {
    fn from(codes: Vec<T>) -> Self {
        ArtifactSelector::Codes(codes.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ArtifactCode>, const N: usize> From<[T; N]> for ArtifactSelector {
    fn from(codes: [T; N]) -> Self {
        ArtifactSelector::Codes(codes.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for ArtifactSelector {
    fn from(name: &str) -> Self {
        ArtifactSelector::Codes(vec![ArtifactCode::from(name)])
    }
}

impl From<i64> for ArtifactSelector {
    fn from(code: i64) -> Self {
        ArtifactSelector::Codes(vec![ArtifactCode::Index(code)])
    }
}

#[derive(Debug)]
enum Token<'a> {
    Quoted(&'a str),
    Bare(&'a str),
}

impl Token<'_> {
    fn into_code(self) -> Result<ArtifactCode> {
        match self {
            Token::Quoted(name) => Ok(ArtifactCode::Name(name.to_string())),
            Token::Bare(text) => {
                let text = text.trim();
                if let Ok(code) = text.parse::<i64>() {
                    return Ok(ArtifactCode::Index(code));
                }
                if text.parse::<f64>().is_ok() {
                    return Err(Error::InvalidSelectorType(format!(
                        "artifact code {} is not an integer",
                        text
                    )));
                }
                Ok(ArtifactCode::Name(text.to_string()))
            }
        }
    }
}

fn quoted(input: &str) -> IResult<&str, Token<'_>> {
    map(
        alt((
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        )),
        Token::Quoted,
    )(input)
}

fn bare(input: &str) -> IResult<&str, Token<'_>> {
    map(is_not(","), Token::Bare)(input)
}

fn entry(input: &str) -> IResult<&str, Token<'_>> {
    delimited(multispace0, alt((quoted, bare)), multispace0)(input)
}

fn entries(input: &str) -> IResult<&str, Vec<Token<'_>>> {
    all_consuming(separated_list1(char(','), entry))(input)
}
