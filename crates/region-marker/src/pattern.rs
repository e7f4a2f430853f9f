//! Pattern matcher capability.
//!
//! The engines only need to know whether a line (or a part of it) matches and what the captured
//! groups were. [`LinePattern`] expresses exactly that and is implemented for [`regex::Regex`].
//! All reported spans are **character columns** (not byte offsets), matching [`Position`]
//! columns.
//!
//! [`Position`]: crate::Position

use regex::{Captures, Regex};

use crate::error::RegionError;

/// The result of one pattern match within a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Group 0 followed by every capture group (`None` for groups that did not participate).
    groups: Vec<Option<String>>,
    /// Inclusive start column of the whole match.
    start: usize,
    /// Exclusive end column of the whole match.
    end: usize,
}

impl PatternMatch {
    /// Build a match from its groups and character span.
    pub fn new(groups: Vec<Option<String>>, start: usize, end: usize) -> Self {
        Self { groups, start, end }
    }

    /// The full matched text.
    pub fn as_str(&self) -> &str {
        self.group(0).unwrap_or("")
    }

    /// The text of capture group `index` (0 is the whole match).
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// Number of groups including group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Inclusive start column.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end column.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` for zero-width matches.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Something that can test a line and report captured groups.
pub trait LinePattern {
    /// Does `line` contain a match?
    fn is_match(&self, line: &str) -> bool;

    /// The leftmost match in `line`, if any.
    fn captures(&self, line: &str) -> Option<PatternMatch>;

    /// Every successive non-overlapping match in `line`, left to right.
    fn find_all(&self, line: &str) -> Vec<PatternMatch>;
}

impl LinePattern for Regex {
    fn is_match(&self, line: &str) -> bool {
        Regex::is_match(self, line)
    }

    fn captures(&self, line: &str) -> Option<PatternMatch> {
        let caps = Regex::captures(self, line)?;
        let mut columns = ColumnCursor::new(line);
        Some(to_pattern_match(&caps, &mut columns))
    }

    fn find_all(&self, line: &str) -> Vec<PatternMatch> {
        let mut columns = ColumnCursor::new(line);
        self.captures_iter(line)
            .map(|caps| to_pattern_match(&caps, &mut columns))
            .collect()
    }
}

/// Compile `pattern` into a [`Regex`].
pub fn compile(pattern: &str) -> Result<Regex, RegionError> {
    Regex::new(pattern).map_err(|source| RegionError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn to_pattern_match(caps: &Captures<'_>, columns: &mut ColumnCursor<'_>) -> PatternMatch {
    let groups = caps
        .iter()
        .map(|group| group.map(|m| m.as_str().to_string()))
        .collect();
    // Group 0 always participates.
    let (start_byte, end_byte) = caps
        .get(0)
        .map(|m| (m.start(), m.end()))
        .unwrap_or_default();
    let start = columns.column_at(start_byte);
    let end = columns.column_at(end_byte);
    PatternMatch::new(groups, start, end)
}

/// Converts monotonically increasing byte offsets into character columns without rescanning the
/// line from the beginning for every match.
struct ColumnCursor<'a> {
    text: &'a str,
    byte: usize,
    column: usize,
}

impl<'a> ColumnCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            column: 0,
        }
    }

    fn column_at(&mut self, byte_offset: usize) -> usize {
        let byte_offset = byte_offset.min(self.text.len());
        if byte_offset < self.byte {
            self.byte = 0;
            self.column = 0;
        }
        let skipped = self
            .text
            .get(self.byte..byte_offset)
            .map(|s| s.chars().count())
            .unwrap_or(0);
        self.byte = byte_offset;
        self.column += skipped;
        self.column
    }
}
