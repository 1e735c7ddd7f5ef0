//! Line identifiers, alphabetic buckets and stop indices.
//!
//! All three travel inside callback tokens, so each one is validated at
//! construction to never contain the token delimiter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Delimiter separating token segments.
pub const DELIMITER: char = '_';

/// Longest line identifier accepted, in bytes. Keeps the deepest token well
/// under the callback payload ceiling.
pub const MAX_LINE_LEN: usize = 8;

/// Error returned when a line identifier or bucket cannot travel in a token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token argument {value:?}: {reason}")]
pub struct InvalidArgument {
    value: String,
    reason: &'static str,
}

/// A line identifier such as `"1"`, `"R"` or `"C4a"`.
///
/// # Examples
///
/// ```
/// use transit_bot::domain::LineId;
///
/// let line = LineId::parse("C4a").unwrap();
/// assert_eq!(line.as_str(), "C4a");
///
/// assert!(LineId::parse("").is_err());
/// assert!(LineId::parse("C_4").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LineId(String);

impl LineId {
    /// Parse a line identifier. Surrounding whitespace is trimmed.
    pub fn parse(s: &str) -> Result<Self, InvalidArgument> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidArgument {
                value: s.to_string(),
                reason: "must not be empty",
            });
        }
        if s.contains(DELIMITER) {
            return Err(InvalidArgument {
                value: s.to_string(),
                reason: "must not contain the token delimiter",
            });
        }
        if s.len() > MAX_LINE_LEN {
            return Err(InvalidArgument {
                value: s.to_string(),
                reason: "too long",
            });
        }
        if s == AZ {
            return Err(InvalidArgument {
                value: s.to_string(),
                reason: "reserved for A-Z browsing",
            });
        }
        Ok(LineId(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LineId {
    type Error = InvalidArgument;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LineId::parse(&value)
    }
}

impl From<LineId> for String {
    fn from(line: LineId) -> Self {
        line.0
    }
}

/// Wire value of the A-Z pseudo line.
pub const AZ: &str = "A-Z";

/// Which station set a letter menu browses: one line, or every station.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LineSelector {
    Line(LineId),
    AllStations,
}

impl LineSelector {
    pub fn parse(s: &str) -> Result<Self, InvalidArgument> {
        if s == AZ {
            Ok(LineSelector::AllStations)
        } else {
            LineId::parse(s).map(LineSelector::Line)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LineSelector::Line(line) => line.as_str(),
            LineSelector::AllStations => AZ,
        }
    }
}

impl fmt::Display for LineSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First character of a stop name, used for A-Z browsing.
///
/// Kept exactly as the provider spells it: no case folding, no accent
/// stripping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bucket(char);

impl Bucket {
    /// Bucket for a name; `None` for empty names or names starting with the
    /// delimiter.
    pub fn of(name: &str) -> Option<Self> {
        name.chars().next().and_then(|c| Bucket::new(c).ok())
    }

    pub fn new(c: char) -> Result<Self, InvalidArgument> {
        if c == DELIMITER || c.is_whitespace() {
            return Err(InvalidArgument {
                value: c.to_string(),
                reason: "not a valid bucket character",
            });
        }
        Ok(Bucket(c))
    }

    /// Parse a token segment holding exactly one character.
    pub fn parse(s: &str) -> Result<Self, InvalidArgument> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Bucket::new(c),
            _ => Err(InvalidArgument {
                value: s.to_string(),
                reason: "must be a single character",
            }),
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bucket({})", self.0)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a stop inside one catalog generation.
///
/// Only meaningful against the catalog it came from; never persist it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopIndex(pub usize);

impl StopIndex {
    pub fn parse(s: &str) -> Option<Self> {
        // Reject signs and leading '+' that usize::from_str would accept.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok().map(StopIndex)
    }
}

impl fmt::Display for StopIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_rejects_delimiter_and_empty() {
        assert!(LineId::parse("").is_err());
        assert!(LineId::parse("   ").is_err());
        assert!(LineId::parse("L_1").is_err());
        assert!(LineId::parse("A-Z").is_err());
        assert!(LineId::parse("VERYLONGLINE").is_err());
    }

    #[test]
    fn line_trims() {
        assert_eq!(LineId::parse(" 10 ").unwrap().as_str(), "10");
    }

    #[test]
    fn selector_parses_az() {
        assert_eq!(LineSelector::parse("A-Z"), Ok(LineSelector::AllStations));
        assert_eq!(
            LineSelector::parse("6"),
            Ok(LineSelector::Line(LineId::parse("6").unwrap()))
        );
        assert_eq!(LineSelector::AllStations.as_str(), "A-Z");
    }

    #[test]
    fn bucket_keeps_raw_character() {
        assert_eq!(Bucket::of("Ópera").unwrap().as_char(), 'Ó');
        assert_eq!(Bucket::of("alameda").unwrap().as_char(), 'a');
        assert!(Bucket::of("").is_none());
        assert!(Bucket::of("_x").is_none());
    }

    #[test]
    fn bucket_parse_single_char() {
        assert_eq!(Bucket::parse("Ó").unwrap().as_char(), 'Ó');
        assert!(Bucket::parse("AB").is_err());
        assert!(Bucket::parse("").is_err());
    }

    #[test]
    fn stop_index_parse() {
        assert_eq!(StopIndex::parse("42"), Some(StopIndex(42)));
        assert_eq!(StopIndex::parse("+4"), None);
        assert_eq!(StopIndex::parse("-1"), None);
        assert_eq!(StopIndex::parse(""), None);
        assert_eq!(StopIndex::parse("x"), None);
    }

    #[test]
    fn line_serde_validates() {
        let line: LineId = serde_json::from_str("\"R\"").unwrap();
        assert_eq!(line.as_str(), "R");
        assert!(serde_json::from_str::<LineId>("\"a_b\"").is_err());
    }
}
