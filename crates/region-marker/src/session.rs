//! Wiring engines to a host's change notifications.
//!
//! A [`RegionMarkers`] session owns a set of block and inline engines and one rescan scheduler.
//! The host forwards notifications (or lets [`RegionMarkers::pump`] pull them), and calls
//! [`RegionMarkers::tick`] from its event loop; a full pass over every engine runs whenever the
//! scheduler fires.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use region_marker::{
//!     BlockPatterns, BlockRegionEngine, EditorHost, InteractionMode, MemoryEditor, PatternMatch,
//!     Position, RegionMarkers, RenderError,
//! };
//!
//! let mut editor = MemoryEditor::from_lines(&["intro", ":::note", "hi", ":::", "outro"]);
//!
//! let engine = BlockRegionEngine::new(
//!     BlockPatterns::new("^:::note$", "^:::$").unwrap(),
//!     |_: &PatternMatch, _: &PatternMatch, content: &str| -> Result<String, RenderError> {
//!         Ok(format!("[note: {content}]"))
//!     },
//!     "note-marker",
//!     InteractionMode::ClearOnClick,
//! );
//!
//! let mut session = RegionMarkers::new().with_block(engine);
//! let report = session.attach(&mut editor).unwrap();
//! assert_eq!(report.created.len(), 1);
//!
//! // Cursor movement only schedules a rescan; it runs once the quiet period has passed.
//! let t0 = Instant::now();
//! editor.set_cursor(Position::new(4, 0));
//! assert!(session.pump(&mut editor, t0, false).unwrap().is_none());
//! let report = session
//!     .pump(&mut editor, t0 + Duration::from_millis(100), false)
//!     .unwrap()
//!     .expect("debounced scan");
//! assert_eq!(report.already_marked, 1);
//! ```

use std::time::Instant;

use log::{debug, trace};

use crate::block::BlockRegionEngine;
use crate::error::RegionError;
use crate::host::{ChangeKind, EditorHost, MarkerId};
use crate::inline::InlineRegionEngine;
use crate::schedule::{ScanScheduler, SchedulePolicy};

/// Outcome of one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Block regions detected.
    pub block_matches: usize,
    /// Inline spans accepted (after the overlap guard).
    pub inline_matches: usize,
    /// Markers created by this pass.
    pub created: Vec<MarkerId>,
    /// Matches skipped because a marker of the same class already existed.
    pub already_marked: usize,
    /// Matches skipped because the cursor was inside.
    pub under_cursor: usize,
    /// Inline candidates rejected for overlapping an accepted span.
    pub rejected_overlap: usize,
}

impl ScanReport {
    /// Fold another report into this one.
    pub fn merge(&mut self, other: ScanReport) {
        self.block_matches += other.block_matches;
        self.inline_matches += other.inline_matches;
        self.created.extend(other.created);
        self.already_marked += other.already_marked;
        self.under_cursor += other.under_cursor;
        self.rejected_overlap += other.rejected_overlap;
    }

    /// Whether anything was detected at all.
    pub fn is_empty(&self) -> bool {
        self.block_matches == 0 && self.inline_matches == 0
    }
}

/// Which notifications schedule a rescan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeTriggers {
    /// Rescan on [`ChangeKind::CursorActivity`].
    pub cursor_activity: bool,
    /// Rescan on [`ChangeKind::ViewportChange`].
    pub viewport_change: bool,
    /// Rescan on [`ChangeKind::OptionChange`].
    pub option_change: bool,
}

impl ChangeTriggers {
    /// Whether `kind` schedules a rescan.
    pub fn accepts(&self, kind: ChangeKind) -> bool {
        match kind {
            ChangeKind::CursorActivity => self.cursor_activity,
            ChangeKind::ViewportChange => self.viewport_change,
            ChangeKind::OptionChange => self.option_change,
        }
    }
}

impl Default for ChangeTriggers {
    fn default() -> Self {
        Self {
            cursor_activity: true,
            viewport_change: true,
            option_change: true,
        }
    }
}

/// A set of engines sharing one rescan scheduler.
pub struct RegionMarkers<W> {
    blocks: Vec<BlockRegionEngine<W>>,
    inlines: Vec<InlineRegionEngine<W>>,
    scheduler: ScanScheduler,
    triggers: ChangeTriggers,
    scan_count: u64,
}

impl<W: Clone> RegionMarkers<W> {
    /// Create an empty session with the default debounce.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            inlines: Vec::new(),
            scheduler: ScanScheduler::default(),
            triggers: ChangeTriggers::default(),
            scan_count: 0,
        }
    }

    /// Use a different scheduling policy.
    pub fn with_policy(mut self, policy: SchedulePolicy) -> Self {
        self.scheduler = ScanScheduler::new(policy);
        self
    }

    /// Choose which notifications schedule a rescan.
    pub fn with_triggers(mut self, triggers: ChangeTriggers) -> Self {
        self.triggers = triggers;
        self
    }

    /// Add a block engine.
    pub fn with_block(mut self, engine: BlockRegionEngine<W>) -> Self {
        self.blocks.push(engine);
        self
    }

    /// Add an inline engine.
    pub fn with_inline(mut self, engine: InlineRegionEngine<W>) -> Self {
        self.inlines.push(engine);
        self
    }

    /// Number of completed scan passes.
    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    /// Whether a rescan is pending.
    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Latest moment the pending rescan is due.
    pub fn deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Run the initial pass over the current viewport.
    pub fn attach<E>(&mut self, editor: &mut E) -> Result<ScanReport, RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        // Notifications from before the session existed are covered by this pass.
        let _ = editor.take_changes();
        self.scheduler.cancel();
        self.process(editor)
    }

    /// Record a change notification.
    pub fn notify(&mut self, kind: ChangeKind, now: Instant) {
        if self.triggers.accepts(kind) {
            trace!("rescan requested by {kind:?}");
            self.scheduler.notify(now);
        }
    }

    /// Run a pass if the scheduler fires at `now`.
    pub fn tick<E>(
        &mut self,
        editor: &mut E,
        now: Instant,
        idle: bool,
    ) -> Result<Option<ScanReport>, RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        if !self.scheduler.poll(now, idle) {
            return Ok(None);
        }
        self.process(editor).map(Some)
    }

    /// Pull the host's pending notifications, then [`tick`](Self::tick).
    pub fn pump<E>(
        &mut self,
        editor: &mut E,
        now: Instant,
        idle: bool,
    ) -> Result<Option<ScanReport>, RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        for kind in editor.take_changes() {
            self.notify(kind, now);
        }
        self.tick(editor, now, idle)
    }

    /// Run every block engine, then every inline engine.
    pub fn process<E>(&mut self, editor: &mut E) -> Result<ScanReport, RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        let mut report = ScanReport::default();
        for engine in &mut self.blocks {
            report.merge(engine.process(editor)?);
        }
        for engine in &mut self.inlines {
            report.merge(engine.process(editor)?);
        }
        self.scan_count += 1;
        debug!(
            "scan #{}: {} markers created",
            self.scan_count,
            report.created.len()
        );
        Ok(report)
    }
}

impl<W: Clone> Default for RegionMarkers<W> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_reports() {
        let mut a = ScanReport {
            block_matches: 1,
            created: vec![MarkerId(1)],
            ..ScanReport::default()
        };
        a.merge(ScanReport {
            inline_matches: 2,
            created: vec![MarkerId(2)],
            rejected_overlap: 1,
            ..ScanReport::default()
        });
        assert_eq!(a.block_matches, 1);
        assert_eq!(a.inline_matches, 2);
        assert_eq!(a.created, vec![MarkerId(1), MarkerId(2)]);
        assert_eq!(a.rejected_overlap, 1);
        assert!(!a.is_empty());
        assert!(ScanReport::default().is_empty());
    }

    #[test]
    fn test_triggers() {
        let triggers = ChangeTriggers {
            option_change: false,
            ..ChangeTriggers::default()
        };
        assert!(triggers.accepts(ChangeKind::CursorActivity));
        assert!(triggers.accepts(ChangeKind::ViewportChange));
        assert!(!triggers.accepts(ChangeKind::OptionChange));
    }
}
