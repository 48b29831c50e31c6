//! Topic pattern compiler and capture extractor.
//!
//! A pattern is a `/`-separated list of segments. A segment that is exactly
//! `+` or `*` is a single-level wildcard: it matches one whole topic segment
//! (possibly empty) and captures its content. Every other segment is matched
//! verbatim, so `*` inside a longer segment is an ordinary topic character.
//! `+` must occupy a whole segment, as in MQTT topic filters.

use mqosc_core::PatternError;
use std::fmt;

/// Hierarchy delimiter for topics and patterns.
pub const DELIMITER: char = '/';

/// Markers accepted as single-level wildcards.
pub const WILDCARDS: [&str; 2] = ["+", "*"];

const SINGLE_LEVEL: char = '+';
const MULTI_LEVEL: char = '#';

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard,
}

/// A compiled subscription pattern.
///
/// Immutable once compiled; the source string is kept for subscriptions and
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    wildcards: usize,
}

impl Pattern {
    /// Compile a pattern.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut segments = Vec::new();
        let mut wildcards = 0;
        for part in pattern.split(DELIMITER) {
            if WILDCARDS.contains(&part) {
                segments.push(Segment::Wildcard);
                wildcards += 1;
            } else if part.contains(MULTI_LEVEL) {
                return Err(PatternError::MultiLevel(part.to_owned()));
            } else if part.contains(SINGLE_LEVEL) {
                return Err(PatternError::MixedWildcard(part.to_owned()));
            } else {
                segments.push(Segment::Literal(part.to_owned()));
            }
        }

        Ok(Self {
            source: pattern.to_owned(),
            segments,
            wildcards,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of wildcard segments, i.e. captures per match.
    pub fn wildcard_count(&self) -> usize {
        self.wildcards
    }

    /// Number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Whether `topic` matches this pattern.
    pub fn matches(&self, topic: &str) -> bool {
        self.captures(topic).is_some()
    }

    /// Extract the wildcard captures from `topic`.
    ///
    /// Returns `None` if the segment count differs or a literal segment
    /// disagrees; a partial capture list is never returned.
    pub fn captures<'t>(&self, topic: &'t str) -> Option<Captures<'t>> {
        let mut values = Vec::with_capacity(self.wildcards);
        let mut parts = topic.split(DELIMITER);

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Wildcard => values.push(part),
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
            }
        }

        if parts.next().is_some() {
            return None;
        }
        Some(Captures { values })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

/// Ordered wildcard captures of one matched topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captures<'t> {
    values: Vec<&'t str>,
}

impl<'t> Captures<'t> {
    /// Capture by 1-based index, matching the `capture_<n>` keys.
    pub fn get(&self, index: usize) -> Option<&'t str> {
        index.checked_sub(1).and_then(|i| self.values.get(i).copied())
    }

    /// Number of captures.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Captures in left-to-right order.
    pub fn iter(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.values.iter().copied()
    }

    /// Captures as a slice.
    pub fn as_slice(&self) -> &[&'t str] {
        &self.values
    }
}

impl<'t> IntoIterator for Captures<'t> {
    type Item = &'t str;
    type IntoIter = std::vec::IntoIter<&'t str>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
