//! The editor interface the engines are driven against.
//!
//! A host editor owns the document, the viewport, the cursor and the marker set. The engines only
//! read lines, query markers and ask the host to create or clear them. [`MemoryEditor`] is the
//! in-crate implementation; real frontends implement [`EditorHost`] over their own buffers.
//!
//! [`MemoryEditor`]: crate::MemoryEditor

use std::borrow::Cow;

use crate::position::{Position, ScreenCoords, Viewport};
use crate::widget::Replacement;

/// Identifier of a marker created through [`EditorHost::mark_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Change notification kinds a host emits and the engines rescan on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// The cursor or selection moved.
    CursorActivity,
    /// The rendered line range changed (scrolling, resizing).
    ViewportChange,
    /// An editor option changed.
    OptionChange,
}

/// A marker as reported by [`EditorHost::find_marks_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerInfo {
    /// Marker id.
    pub id: MarkerId,
    /// Class tag the marker was created with.
    pub class_name: String,
    /// Start of the marked range.
    pub from: Position,
    /// End of the marked range.
    pub to: Position,
}

/// Options for [`EditorHost::mark_text`].
#[derive(Debug, Clone)]
pub struct MarkOptions<W> {
    /// What to display instead of the marked text.
    pub replaced_with: Replacement<W>,
    /// Class tag used for lookups.
    pub class_name: String,
    /// Whether text inserted at the start boundary joins the marker.
    pub inclusive_left: bool,
    /// Whether text inserted at the end boundary joins the marker.
    pub inclusive_right: bool,
    /// Whether pointer events over the replacement are routed to it instead of the editor.
    pub handle_mouse_events: bool,
}

impl<W> MarkOptions<W> {
    /// Exclusive on both sides, routing pointer events to the replacement.
    pub fn replace(replaced_with: Replacement<W>, class_name: impl Into<String>) -> Self {
        Self {
            replaced_with,
            class_name: class_name.into(),
            inclusive_left: false,
            inclusive_right: false,
            handle_mouse_events: true,
        }
    }
}

/// Inbound interface from the host editor.
///
/// All methods are called from the host's UI thread; nothing here is required to be `Send`.
pub trait EditorHost {
    /// The host's widget handle type. Opaque to the engines.
    type Widget;

    /// Total number of logical lines.
    fn line_count(&self) -> usize;

    /// Text of `line` without its line terminator, or `None` past the end of the document.
    fn line(&self, line: usize) -> Option<Cow<'_, str>>;

    /// The line range currently rendered.
    fn viewport(&self) -> Viewport;

    /// The primary cursor.
    fn cursor(&self) -> Position;

    /// Move the primary cursor.
    fn set_cursor(&mut self, position: Position);

    /// Every marker whose range contains `position` (both ends inclusive).
    fn find_marks_at(&self, position: Position) -> Vec<MarkerInfo>;

    /// Replace `from..to` with a widget without modifying the text.
    fn mark_text(
        &mut self,
        from: Position,
        to: Position,
        options: MarkOptions<Self::Widget>,
    ) -> MarkerId;

    /// Current range of a marker.
    fn marker_range(&self, marker: MarkerId) -> Option<(Position, Position)>;

    /// Remove a marker, restoring the plain text. Returns `false` if it did not exist.
    fn clear_marker(&mut self, marker: MarkerId) -> bool;

    /// Mutable access to what a marker displays (hover state, edit buttons).
    fn replacement_mut(&mut self, marker: MarkerId) -> Option<&mut Replacement<Self::Widget>>;

    /// The document position nearest to the given pointer coordinates.
    fn coords_char(&self, coords: ScreenCoords) -> Position;

    /// Give input focus back to the editor.
    fn focus(&mut self);

    /// Change notifications emitted since the previous call.
    fn take_changes(&mut self) -> Vec<ChangeKind>;

    /// Run `f` as one rendering transaction.
    ///
    /// Hosts that re-layout after each mutation should defer that work until `f` returns.
    fn operation<R, F>(&mut self, f: F) -> R
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> R,
    {
        f(self)
    }
}
