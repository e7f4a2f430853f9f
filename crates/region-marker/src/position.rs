//! Logical coordinates shared by the engines and their hosts.

use std::cmp::Ordering;
use std::ops::Range;

/// Position coordinates (line and column numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub column: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.column.cmp(&other.column))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The half-open logical line range `[from, to)` a host currently renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// First rendered line (inclusive).
    pub from: usize,
    /// Line after the last rendered line (exclusive).
    pub to: usize,
}

impl Viewport {
    /// Create a viewport covering `from..to`.
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    /// Returns `true` when no line is covered.
    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }

    /// Check whether `line` is rendered.
    pub fn contains(&self, line: usize) -> bool {
        self.from <= line && line < self.to
    }

    /// Restrict the viewport to a document of `line_count` lines.
    pub fn clamp_to(self, line_count: usize) -> Self {
        let to = self.to.min(line_count);
        Self {
            from: self.from.min(to),
            to,
        }
    }

    /// The covered lines as a range.
    pub fn lines(&self) -> Range<usize> {
        self.from..self.to
    }
}

impl From<Range<usize>> for Viewport {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

/// Pointer coordinates in host pixels, relative to the top-left corner of the rendered viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenCoords {
    /// Horizontal distance from the left edge.
    pub left: f32,
    /// Vertical distance from the top edge.
    pub top: f32,
}

impl ScreenCoords {
    /// Create pointer coordinates.
    pub fn new(left: f32, top: f32) -> Self {
        Self { left, top }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 0) > Position::new(0, 99));
        assert!(Position::new(2, 3) < Position::new(2, 4));
        assert_eq!(
            Position::new(4, 1).cmp(&Position::new(4, 1)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_viewport_clamp() {
        let viewport = Viewport::new(3, 50).clamp_to(10);
        assert_eq!(viewport, Viewport::new(3, 10));
        assert_eq!(viewport.len(), 7);

        let past_end = Viewport::new(20, 30).clamp_to(10);
        assert!(past_end.is_empty());
        assert_eq!(past_end.lines(), 10..10);
    }

    #[test]
    fn test_viewport_contains() {
        let viewport = Viewport::from(2..5);
        assert!(!viewport.contains(1));
        assert!(viewport.contains(2));
        assert!(viewport.contains(4));
        assert!(!viewport.contains(5));
    }
}
