//! Replacement widgets attached to markers.
//!
//! The renderers produce an opaque `W`. Block widgets are wrapped in a [`BlockContainer`] that
//! carries the hover border and the optional edit affordance; inline widgets are wrapped in an
//! [`InlineWidget`].

/// Border color shown while the pointer hovers a block container.
pub const HIGHLIGHT_COLOR: &str = "#19a2f0";
/// Border width of a block container, in pixels.
pub const CONTAINER_BORDER_WIDTH: u32 = 2;
/// Inner padding of a block container, in pixels.
pub const CONTAINER_PADDING: u32 = 2;
/// Corner radius of a block container, in pixels.
pub const CONTAINER_RADIUS: u32 = 4;
/// Label of the edit affordance.
pub const EDIT_BUTTON_LABEL: &str = "/";

/// How the user gets back to the raw text of a block region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Clicking anywhere on the container clears the marker at the click position.
    #[default]
    ClearOnClick,
    /// A small edit button, visible only on hover, clears the marker.
    EditButton,
}

impl InteractionMode {
    /// `true` selects [`InteractionMode::ClearOnClick`].
    pub fn from_clear_on_click(clear_on_click: bool) -> Self {
        if clear_on_click {
            Self::ClearOnClick
        } else {
            Self::EditButton
        }
    }
}

/// Container border state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// Border space reserved but invisible.
    Transparent,
    /// Highlighted with [`HIGHLIGHT_COLOR`].
    Highlight,
}

impl Border {
    /// CSS-style color of the border, `None` when transparent.
    pub fn color(self) -> Option<&'static str> {
        match self {
            Self::Transparent => None,
            Self::Highlight => Some(HIGHLIGHT_COLOR),
        }
    }
}

/// The edit affordance of an [`InteractionMode::EditButton`] container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditButton {
    /// Button label.
    pub label: &'static str,
    /// Whether the button is currently shown.
    pub visible: bool,
}

impl Default for EditButton {
    fn default() -> Self {
        Self {
            label: EDIT_BUTTON_LABEL,
            visible: false,
        }
    }
}

/// Wrapper around a rendered block widget.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockContainer<W> {
    widget: W,
    mode: InteractionMode,
    border: Border,
    edit_button: Option<EditButton>,
}

impl<W> BlockContainer<W> {
    /// Wrap `widget`, adding an edit button in [`InteractionMode::EditButton`] mode.
    pub fn new(widget: W, mode: InteractionMode) -> Self {
        let edit_button = match mode {
            InteractionMode::ClearOnClick => None,
            InteractionMode::EditButton => Some(EditButton::default()),
        };
        Self {
            widget,
            mode,
            border: Border::Transparent,
            edit_button,
        }
    }

    /// The renderer's widget.
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// Interaction mode chosen at creation.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Current border state.
    pub fn border(&self) -> Border {
        self.border
    }

    /// The edit button, if this container has one.
    pub fn edit_button(&self) -> Option<&EditButton> {
        self.edit_button.as_ref()
    }

    /// Whether the edit button is currently shown.
    pub fn edit_button_visible(&self) -> bool {
        self.edit_button.as_ref().is_some_and(|b| b.visible)
    }

    /// Apply pointer enter (`true`) or leave (`false`). Returns whether anything changed.
    pub fn set_hovered(&mut self, hovered: bool) -> bool {
        let border = if hovered {
            Border::Highlight
        } else {
            Border::Transparent
        };
        let mut changed = self.border != border;
        self.border = border;
        if let Some(button) = self.edit_button.as_mut() {
            changed |= button.visible != hovered;
            button.visible = hovered;
        }
        changed
    }
}

/// A rendered inline widget.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineWidget<W> {
    /// The renderer's widget.
    pub widget: W,
    /// Whether clicking the widget clears it.
    pub clear_on_click: bool,
}

/// What a marker displays in place of its text.
#[derive(Debug, Clone, PartialEq)]
pub enum Replacement<W> {
    /// A block region container.
    Block(BlockContainer<W>),
    /// An inline span widget.
    Inline(InlineWidget<W>),
}

impl<W> Replacement<W> {
    /// The renderer's widget, regardless of kind.
    pub fn widget(&self) -> &W {
        match self {
            Self::Block(container) => container.widget(),
            Self::Inline(inline) => &inline.widget,
        }
    }

    /// The block container, if this is a block replacement.
    pub fn as_block(&self) -> Option<&BlockContainer<W>> {
        match self {
            Self::Block(container) => Some(container),
            Self::Inline(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_on_click_container_has_no_button() {
        let mut container = BlockContainer::new("w", InteractionMode::ClearOnClick);
        assert!(container.edit_button().is_none());
        assert_eq!(container.border(), Border::Transparent);

        assert!(container.set_hovered(true));
        assert_eq!(container.border().color(), Some(HIGHLIGHT_COLOR));
        assert!(!container.edit_button_visible());
        assert!(!container.set_hovered(true));
    }

    #[test]
    fn test_edit_button_follows_hover() {
        let mut container = BlockContainer::new(1u8, InteractionMode::EditButton);
        assert_eq!(container.edit_button().map(|b| b.label), Some("/"));
        assert!(!container.edit_button_visible());

        container.set_hovered(true);
        assert!(container.edit_button_visible());

        container.set_hovered(false);
        assert!(!container.edit_button_visible());
        assert_eq!(container.border().color(), None);
    }

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(
            InteractionMode::from_clear_on_click(true),
            InteractionMode::ClearOnClick
        );
        assert_eq!(
            InteractionMode::from_clear_on_click(false),
            InteractionMode::EditButton
        );
    }
}
