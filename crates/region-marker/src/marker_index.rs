//! Marker span index.
//!
//! Keeps marker spans sorted by start offset, with a prefix maximum of end offsets for pruning
//! point and range queries.

use crate::host::MarkerId;

/// A marker's span in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset.
    pub end: usize,
    /// Marker owning this span.
    pub id: MarkerId,
}

impl MarkerSpan {
    /// Create a span.
    pub fn new(start: usize, end: usize, id: MarkerId) -> Self {
        Self { start, end, id }
    }

    /// Check if the span touches `pos` (both ends inclusive, like marker lookups).
    pub fn touches(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Check if two spans overlap (half-open).
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

/// Sorted marker span index.
///
/// Query complexity: O(log n + k) for typical marker layouts.
/// Insertion complexity: O(n) (requires maintaining sort order).
#[derive(Debug, Default)]
pub struct MarkerIndex {
    /// Spans sorted by start, ties by insertion order.
    spans: Vec<MarkerSpan>,
    /// `prefix_max_end[i] = max(spans[0..=i].end)`
    prefix_max_end: Vec<usize>,
}

impl MarkerIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    fn rebuild_prefix_max_end_from(&mut self, start_idx: usize) {
        if self.spans.is_empty() {
            self.prefix_max_end.clear();
            return;
        }

        if self.prefix_max_end.len() != self.spans.len() {
            self.prefix_max_end.resize(self.spans.len(), 0);
        }

        let mut max_end = if start_idx == 0 {
            0
        } else {
            self.prefix_max_end[start_idx - 1]
        };

        for (idx, span) in self.spans.iter().enumerate().skip(start_idx) {
            max_end = max_end.max(span.end);
            self.prefix_max_end[idx] = max_end;
        }
    }

    /// Insert a span.
    pub fn insert(&mut self, span: MarkerSpan) {
        let pos = self.spans.partition_point(|s| s.start <= span.start);
        self.spans.insert(pos, span);
        self.prefix_max_end.insert(pos, 0);
        self.rebuild_prefix_max_end_from(pos);
    }

    /// Remove the span of `id`, returning it.
    pub fn remove(&mut self, id: MarkerId) -> Option<MarkerSpan> {
        let pos = self.spans.iter().position(|s| s.id == id)?;
        let span = self.spans.remove(pos);
        self.prefix_max_end.remove(pos);
        if pos < self.spans.len() {
            self.rebuild_prefix_max_end_from(pos);
        }
        Some(span)
    }

    /// Look up the span of `id`.
    pub fn get(&self, id: MarkerId) -> Option<MarkerSpan> {
        self.spans.iter().find(|s| s.id == id).copied()
    }

    /// All spans touching `pos`, in start order.
    pub fn query_point(&self, pos: usize) -> Vec<MarkerSpan> {
        // All spans with start <= pos are before idx.
        let idx = self.spans.partition_point(|s| s.start <= pos);

        let mut result = Vec::new();
        for i in (0..idx).rev() {
            // Nothing earlier can reach pos.
            if self.prefix_max_end[i] < pos {
                break;
            }
            let span = self.spans[i];
            if span.touches(pos) {
                result.push(span);
            }
        }
        result.reverse();
        result
    }

    /// All spans overlapping `start..end`, in start order.
    pub fn query_range(&self, start: usize, end: usize) -> Vec<MarkerSpan> {
        if self.spans.is_empty() || start >= end {
            return Vec::new();
        }

        let search_end = self.spans.partition_point(|s| s.start < end);
        if search_end == 0 {
            return Vec::new();
        }

        let mut scan_start = self.spans.partition_point(|s| s.start < start).min(search_end);
        while scan_start > 0 && self.prefix_max_end[scan_start - 1] > start {
            scan_start -= 1;
        }

        self.spans[scan_start..search_end]
            .iter()
            .filter(|span| span.overlaps(start, end))
            .copied()
            .collect()
    }

    /// Iterate spans in start order.
    pub fn iter(&self) -> impl Iterator<Item = &MarkerSpan> {
        self.spans.iter()
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.spans.clear();
        self.prefix_max_end.clear();
    }

    /// Number of spans.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
