//! Pointer interaction with rendered regions.
//!
//! Hosts forward pointer events that land on a marker's replacement to [`dispatch_pointer`].
//! Clearing a marker never touches the document text; it only removes the widget so the raw
//! text becomes editable again.

use log::debug;

use crate::host::{EditorHost, MarkerId};
use crate::position::{Position, ScreenCoords};
use crate::widget::{InteractionMode, Replacement};

/// Pointer events delivered to a marker's replacement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// The pointer entered the replacement.
    Enter,
    /// The pointer left the replacement.
    Leave,
    /// The replacement body was clicked at the given coordinates.
    Click(ScreenCoords),
    /// The edit button of a block container was activated.
    EditButton,
}

/// What [`dispatch_pointer`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Nothing happened.
    Ignored,
    /// Hover state changed.
    HoverChanged,
    /// The marker was cleared.
    Cleared,
}

/// Returns a handler that clears `marker`, moves the cursor to the document position under the
/// pointer and focuses the editor.
///
/// The handler returns `false` (and does nothing else) if the marker no longer exists.
pub fn click_and_clear<E>(marker: MarkerId) -> impl Fn(&mut E, ScreenCoords) -> bool
where
    E: EditorHost,
{
    move |editor: &mut E, coords: ScreenCoords| {
        if !editor.clear_marker(marker) {
            return false;
        }
        let position = editor.coords_char(coords);
        debug!("click-and-clear {marker:?}, cursor to {position:?}");
        editor.set_cursor(position);
        editor.focus();
        true
    }
}

/// Clear a block marker and put the cursor at the start of its first content line.
pub fn edit_and_clear<E>(editor: &mut E, marker: MarkerId) -> bool
where
    E: EditorHost,
{
    let Some((from, _)) = editor.marker_range(marker) else {
        return false;
    };
    if !editor.clear_marker(marker) {
        return false;
    }
    debug!("edit {marker:?}, cursor to line {}", from.line + 1);
    editor.set_cursor(Position::new(from.line + 1, 0));
    true
}

/// Route a pointer event to the replacement of `marker`.
pub fn dispatch_pointer<E>(editor: &mut E, marker: MarkerId, event: PointerEvent) -> PointerOutcome
where
    E: EditorHost,
{
    let Some(replacement) = editor.replacement_mut(marker) else {
        return PointerOutcome::Ignored;
    };

    match (replacement, event) {
        (Replacement::Block(container), PointerEvent::Enter | PointerEvent::Leave) => {
            if container.set_hovered(event == PointerEvent::Enter) {
                PointerOutcome::HoverChanged
            } else {
                PointerOutcome::Ignored
            }
        }
        (Replacement::Block(container), PointerEvent::Click(coords)) => match container.mode() {
            InteractionMode::ClearOnClick => cleared(click_and_clear(marker)(editor, coords)),
            InteractionMode::EditButton => PointerOutcome::Ignored,
        },
        (Replacement::Block(container), PointerEvent::EditButton) => match container.mode() {
            InteractionMode::EditButton => cleared(edit_and_clear(editor, marker)),
            InteractionMode::ClearOnClick => PointerOutcome::Ignored,
        },
        (Replacement::Inline(inline), PointerEvent::Click(coords)) if inline.clear_on_click => {
            cleared(click_and_clear(marker)(editor, coords))
        }
        (Replacement::Inline(_), _) => PointerOutcome::Ignored,
    }
}

fn cleared(done: bool) -> PointerOutcome {
    if done {
        PointerOutcome::Cleared
    } else {
        PointerOutcome::Ignored
    }
}
