//! In-memory reference host.
//!
//! [`MemoryEditor`] implements [`EditorHost`] over a [`Rope`]. It is what the crate's tests and
//! examples drive the engines against, and it is small enough to embed in frontends that do not
//! have a marker model of their own.
//!
//! # Coordinates
//!
//! Positions follow the usual editor clamping rules: a line past the end of the document clamps
//! to the last line, and a column past the end of a line clamps to the line end (so a block range
//! ending at `(line, len + 1)` ends right before that line's terminator).
//!
//! # Change notifications
//!
//! Cursor, viewport and option updates that actually change something are queued for
//! [`EditorHost::take_changes`] and passed to every callback registered with
//! [`MemoryEditor::subscribe`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};
use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::host::{ChangeKind, EditorHost, MarkOptions, MarkerId, MarkerInfo};
use crate::marker_index::{MarkerIndex, MarkerSpan};
use crate::position::{Position, ScreenCoords, Viewport};
use crate::widget::Replacement;

/// Change notification callback type
pub type ChangeCallback = Box<dyn FnMut(ChangeKind)>;

/// Pixel metrics used by [`EditorHost::coords_char`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    /// Height of one logical line.
    pub line_height: f32,
    /// Width of one display cell (a wide character spans two cells).
    pub char_width: f32,
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            char_width: 8.0,
        }
    }
}

#[derive(Debug)]
struct MarkerEntry<W> {
    class_name: String,
    replacement: Replacement<W>,
    inclusive_left: bool,
    inclusive_right: bool,
    handle_mouse_events: bool,
}

/// Rope-backed [`EditorHost`].
pub struct MemoryEditor<W> {
    rope: Rope,
    viewport: Viewport,
    cursor: Position,
    metrics: CellMetrics,
    options: BTreeMap<String, String>,
    focused: bool,
    markers: HashMap<MarkerId, MarkerEntry<W>>,
    index: MarkerIndex,
    next_marker_id: u64,
    operation_depth: usize,
    transaction_count: u64,
    pending_changes: Vec<ChangeKind>,
    callbacks: Vec<ChangeCallback>,
}

impl<W> MemoryEditor<W> {
    /// Create an editor whose viewport covers the whole document.
    pub fn new(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let viewport = Viewport::new(0, rope.len_lines());
        Self {
            rope,
            viewport,
            cursor: Position::default(),
            metrics: CellMetrics::default(),
            options: BTreeMap::new(),
            focused: false,
            markers: HashMap::new(),
            index: MarkerIndex::new(),
            next_marker_id: 1,
            operation_depth: 0,
            transaction_count: 0,
            pending_changes: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    /// Create an editor from individual lines joined with `\n`.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let text = lines
            .iter()
            .map(|line| line.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(&text)
    }

    /// Use different pixel metrics for pointer mapping.
    pub fn with_metrics(mut self, metrics: CellMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(ChangeKind) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    fn notify_change(&mut self, kind: ChangeKind) {
        trace!("change notification: {kind:?}");
        self.pending_changes.push(kind);
        for callback in &mut self.callbacks {
            callback(kind);
        }
    }

    /// Set the rendered line range. Clamped to the document.
    pub fn set_viewport(&mut self, viewport: impl Into<Viewport>) {
        let viewport = viewport.into().clamp_to(self.rope.len_lines());
        if viewport != self.viewport {
            self.viewport = viewport;
            self.notify_change(ChangeKind::ViewportChange);
        }
    }

    /// Scroll so that `height` lines starting at `top` are rendered.
    pub fn scroll_to(&mut self, top: usize, height: usize) {
        self.set_viewport(Viewport::new(top, top.saturating_add(height)));
    }

    /// Set an editor option.
    pub fn set_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if self.options.get(&name) != Some(&value) {
            self.options.insert(name, value);
            self.notify_change(ChangeKind::OptionChange);
        }
    }

    /// Read an editor option.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Whether the editor currently holds input focus.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Drop input focus.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Number of completed outermost [`EditorHost::operation`] calls.
    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    /// The whole document text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The text between two positions.
    pub fn text_range(&self, from: Position, to: Position) -> String {
        let start = self.position_to_offset(from);
        let end = self.position_to_offset(to).max(start);
        self.rope.slice(start..end).to_string()
    }

    /// Number of live markers.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// All live markers in document order.
    pub fn markers(&self) -> Vec<MarkerInfo> {
        self.index
            .iter()
            .filter_map(|span| self.marker_info(span))
            .collect()
    }

    /// Live markers carrying `class_name`, in document order.
    pub fn markers_with_class(&self, class_name: &str) -> Vec<MarkerInfo> {
        self.markers()
            .into_iter()
            .filter(|info| info.class_name == class_name)
            .collect()
    }

    /// What a marker displays.
    pub fn replacement(&self, marker: MarkerId) -> Option<&Replacement<W>> {
        self.markers.get(&marker).map(|entry| &entry.replacement)
    }

    /// Boundary flags of a marker: `(inclusive_left, inclusive_right, handle_mouse_events)`.
    pub fn marker_flags(&self, marker: MarkerId) -> Option<(bool, bool, bool)> {
        self.markers.get(&marker).map(|entry| {
            (
                entry.inclusive_left,
                entry.inclusive_right,
                entry.handle_mouse_events,
            )
        })
    }

    /// The visible text: every outermost marker's span is replaced by `render(replacement)`.
    pub fn display_text<F>(&self, mut render: F) -> String
    where
        F: FnMut(&Replacement<W>) -> String,
    {
        let mut out = String::with_capacity(self.rope.len_bytes());
        let mut offset = 0;
        for span in self.index.iter() {
            // Nested or overlapping markers are hidden by the outer one.
            if span.start < offset {
                continue;
            }
            let Some(entry) = self.markers.get(&span.id) else {
                continue;
            };
            out.extend(self.rope.slice(offset..span.start).chunks());
            out.push_str(&render(&entry.replacement));
            offset = span.end;
        }
        out.extend(self.rope.slice(offset..).chunks());
        out
    }

    fn marker_info(&self, span: &MarkerSpan) -> Option<MarkerInfo> {
        let entry = self.markers.get(&span.id)?;
        Some(MarkerInfo {
            id: span.id,
            class_name: entry.class_name.clone(),
            from: self.offset_to_position(span.start),
            to: self.offset_to_position(span.end),
        })
    }

    /// Length of `line` in characters, excluding its terminator.
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len == 0 {
            return 0;
        }
        // Same break set as ropey's `unicode_lines`.
        match slice.char(len - 1) {
            '\n' => {
                len -= 1;
                if len > 0 && slice.char(len - 1) == '\r' {
                    len -= 1;
                }
            }
            '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}' => len -= 1,
            _ => {}
        }
        len
    }

    /// Clamp a position to the document.
    pub fn clip_position(&self, position: Position) -> Position {
        let last_line = self.rope.len_lines().saturating_sub(1);
        let line = position.line.min(last_line);
        Position::new(line, position.column.min(self.line_len(line)))
    }

    /// Character offset of a (clamped) position.
    pub fn position_to_offset(&self, position: Position) -> usize {
        let position = self.clip_position(position);
        self.rope.line_to_char(position.line) + position.column
    }

    /// Position of a character offset.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        Position::new(line, offset - self.rope.line_to_char(line))
    }
}

impl<W> EditorHost for MemoryEditor<W> {
    type Widget = W;

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line(&self, line: usize) -> Option<Cow<'_, str>> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let len = self.line_len(line);
        Some(self.rope.line(line).slice(..len).into())
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, position: Position) {
        let position = self.clip_position(position);
        if position != self.cursor {
            self.cursor = position;
            self.notify_change(ChangeKind::CursorActivity);
        }
    }

    fn find_marks_at(&self, position: Position) -> Vec<MarkerInfo> {
        let offset = self.position_to_offset(position);
        self.index
            .query_point(offset)
            .iter()
            .filter_map(|span| self.marker_info(span))
            .collect()
    }

    fn mark_text(&mut self, from: Position, to: Position, options: MarkOptions<W>) -> MarkerId {
        let start = self.position_to_offset(from);
        let end = self.position_to_offset(to).max(start);
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;

        debug!(
            "marker {id:?} '{}' created over chars {start}..{end}",
            options.class_name
        );
        self.index.insert(MarkerSpan::new(start, end, id));
        self.markers.insert(
            id,
            MarkerEntry {
                class_name: options.class_name,
                replacement: options.replaced_with,
                inclusive_left: options.inclusive_left,
                inclusive_right: options.inclusive_right,
                handle_mouse_events: options.handle_mouse_events,
            },
        );
        id
    }

    fn marker_range(&self, marker: MarkerId) -> Option<(Position, Position)> {
        let span = self.index.get(marker)?;
        Some((
            self.offset_to_position(span.start),
            self.offset_to_position(span.end),
        ))
    }

    fn clear_marker(&mut self, marker: MarkerId) -> bool {
        let removed = self.markers.remove(&marker).is_some();
        self.index.remove(marker);
        if removed {
            debug!("marker {marker:?} cleared");
        }
        removed
    }

    fn replacement_mut(&mut self, marker: MarkerId) -> Option<&mut Replacement<W>> {
        self.markers
            .get_mut(&marker)
            .map(|entry| &mut entry.replacement)
    }

    fn coords_char(&self, coords: ScreenCoords) -> Position {
        let row = if coords.top <= 0.0 || self.metrics.line_height <= 0.0 {
            0
        } else {
            (coords.top / self.metrics.line_height) as usize
        };
        let line = self
            .viewport
            .from
            .saturating_add(row)
            .min(self.rope.len_lines().saturating_sub(1));

        let target = if coords.left <= 0.0 || self.metrics.char_width <= 0.0 {
            0.0
        } else {
            coords.left / self.metrics.char_width
        };

        let text = self.line(line).unwrap_or_default();
        let mut cells = 0.0f32;
        let mut column = 0;
        for grapheme in text.graphemes(true) {
            let width = grapheme.width() as f32;
            // Snap to whichever grapheme boundary is closer.
            if cells + width / 2.0 > target {
                break;
            }
            cells += width;
            column += grapheme.chars().count();
        }
        Position::new(line, column)
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn take_changes(&mut self) -> Vec<ChangeKind> {
        std::mem::take(&mut self.pending_changes)
    }

    fn operation<R, F>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.operation_depth += 1;
        let result = f(self);
        self.operation_depth -= 1;
        if self.operation_depth == 0 {
            self.transaction_count += 1;
            trace!("transaction {} committed", self.transaction_count);
        }
        result
    }
}
