#![warn(missing_docs)]
//! Region Marker - Viewport-Incremental Block and Inline Region Rendering
//!
//! # Overview
//!
//! `region-marker` detects delimited regions in the visible part of a line-oriented text buffer
//! and asks the host editor to display a rendered widget in their place. The text itself is never
//! modified; clearing a marker brings the raw text back.
//!
//! It does not render anything by itself: renderers are caller-supplied callbacks producing an
//! opaque widget type, and the host editor is reached through the [`EditorHost`] trait.
//!
//! # Core Features
//!
//! - **Block regions**: begin/end delimiter line pairs, with a downward scan past the viewport for
//!   an unclosed begin delimiter
//! - **Inline regions**: non-overlapping single-line spans from several patterns
//! - **Idempotent scans**: existing markers of the same class are never stacked
//! - **Cursor exclusion**: the block being edited is never hidden
//! - **Debounced rescans**: notification bursts collapse into one pass
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Session (RegionMarkers + scheduler)        │  ← Host event loop
//! ├─────────────────────────────────────────────┤
//! │  Block / Inline Region Engines              │  ← Detection & marking
//! ├─────────────────────────────────────────────┤
//! │  Widgets & Pointer Interaction              │  ← Replacement behavior
//! ├─────────────────────────────────────────────┤
//! │  EditorHost trait (MemoryEditor reference)  │  ← Lines, cursor, markers
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use region_marker::{
//!     BlockPatterns, BlockRegionEngine, EditorHost, InteractionMode, MemoryEditor, PatternMatch,
//!     Position, RenderError,
//! };
//!
//! let mut editor = MemoryEditor::from_lines(&[
//!     "before", ":::test", "line A", "line B", ":::", "after",
//! ]);
//!
//! let mut engine = BlockRegionEngine::new(
//!     BlockPatterns::new(":::test", ":::").unwrap(),
//!     |_: &PatternMatch, _: &PatternMatch, content: &str| -> Result<String, RenderError> {
//!         Ok(format!("<{} lines>", content.lines().count()))
//!     },
//!     "test-marker",
//!     InteractionMode::EditButton,
//! );
//!
//! // Cursor inside the block: nothing is replaced.
//! editor.set_cursor(Position::new(2, 0));
//! assert!(engine.process(&mut editor).unwrap().created.is_empty());
//!
//! // Cursor outside: lines 1..=4 are shown as the widget.
//! editor.set_cursor(Position::new(0, 0));
//! engine.process(&mut editor).unwrap();
//! assert_eq!(
//!     editor.display_text(|r| r.widget().clone()),
//!     "before\n<2 lines>\nafter"
//! );
//! ```
//!
//! # Module Description
//!
//! - [`block`] - Block Region Engine
//! - [`inline`] - Inline Region Engine
//! - [`interaction`] - click-and-clear and pointer dispatch
//! - [`schedule`] - debounce and idle scheduling
//! - [`session`] - engines bound to change notifications
//! - [`host`] - the editor interface
//! - [`document`] - rope-backed reference host
//! - [`widget`] - replacement containers
//! - [`pattern`] - pattern matcher capability

pub mod block;
pub mod document;
mod error;
pub mod host;
pub mod inline;
pub mod interaction;
pub mod marker_index;
pub mod pattern;
mod position;
pub mod schedule;
pub mod session;
pub mod widget;

pub use block::{BlockMatch, BlockPatterns, BlockRegionEngine, BlockRenderer};
pub use document::{CellMetrics, ChangeCallback, MemoryEditor};
pub use error::{RegionError, RenderError};
pub use host::{ChangeKind, EditorHost, MarkOptions, MarkerId, MarkerInfo};
pub use inline::{InlineMatch, InlineRegionEngine, InlineRenderContext, InlineRenderer};
pub use interaction::{
    PointerEvent, PointerOutcome, click_and_clear, dispatch_pointer, edit_and_clear,
};
pub use marker_index::{MarkerIndex, MarkerSpan};
pub use pattern::{LinePattern, PatternMatch};
pub use position::{Position, ScreenCoords, Viewport};
pub use schedule::{
    DEFAULT_IDLE_MAX_WAIT, DEFAULT_QUIET_PERIOD, Debouncer, IdleScheduler, ScanScheduler,
    SchedulePolicy,
};
pub use session::{ChangeTriggers, RegionMarkers, ScanReport};
pub use widget::{
    BlockContainer, Border, EditButton, InlineWidget, InteractionMode, Replacement,
};
