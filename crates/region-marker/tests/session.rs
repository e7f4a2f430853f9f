use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use region_marker::{
    BlockPatterns, BlockRegionEngine, ChangeKind, ChangeTriggers, EditorHost, InlineRegionEngine,
    InlineRenderContext, InteractionMode, MemoryEditor, PatternMatch, PointerEvent, PointerOutcome,
    Position, RegionError, RegionMarkers, RenderError, ScreenCoords, SchedulePolicy,
    dispatch_pointer,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn block_engine() -> BlockRegionEngine<String> {
    BlockRegionEngine::new(
        BlockPatterns::new("^:::test$", "^:::$").unwrap(),
        |_: &PatternMatch, _: &PatternMatch, content: &str| -> Result<String, RenderError> {
            Ok(format!("[{content}]"))
        },
        "test-marker",
        InteractionMode::EditButton,
    )
}

fn math_engine() -> InlineRegionEngine<String> {
    InlineRegionEngine::from_regexes(
        &[r"\$([^$]+)\$"],
        |cx: &InlineRenderContext<'_, String>| -> Result<String, RenderError> {
            Ok(cx.matched.group(1).unwrap_or_default().to_string())
        },
        "math",
    )
    .unwrap()
}

fn sample_editor() -> MemoryEditor<String> {
    MemoryEditor::from_lines(&["before", ":::test", "line A", "line B", ":::", "after $x$"])
}

#[test]
fn test_attach_runs_blocks_and_inlines() {
    let mut editor = sample_editor();
    let mut session = RegionMarkers::new()
        .with_block(block_engine())
        .with_inline(math_engine());

    let report = session.attach(&mut editor).unwrap();
    assert_eq!(report.block_matches, 1);
    assert_eq!(report.inline_matches, 1);
    assert_eq!(report.created.len(), 2);
    assert_eq!(session.scan_count(), 1);
    assert!(!session.is_pending());
    assert_eq!(
        editor.display_text(|r| r.widget().clone()),
        "before\n[line A\nline B]\nafter x"
    );
}

#[test]
fn test_burst_of_notifications_collapses_into_one_scan() {
    let mut editor = sample_editor();
    let mut session = RegionMarkers::new().with_block(block_engine());
    session.attach(&mut editor).unwrap();

    let t0 = Instant::now();
    for i in 0..5u64 {
        editor.set_cursor(Position::new(i as usize + 1, 0));
        let now = t0 + ms(i * 20);
        assert!(session.pump(&mut editor, now, false).unwrap().is_none());
    }
    // The quiet period restarts with every notification.
    assert_eq!(session.deadline(), Some(t0 + ms(180)));

    assert!(session.pump(&mut editor, t0 + ms(179), false).unwrap().is_none());
    assert!(session.pump(&mut editor, t0 + ms(180), false).unwrap().is_some());
    assert_eq!(session.scan_count(), 2);

    // Nothing further is pending.
    assert!(session.pump(&mut editor, t0 + ms(1000), false).unwrap().is_none());
    assert_eq!(session.scan_count(), 2);
}

#[test]
fn test_debounced_rescan_marks_block_after_cursor_leaves() {
    let mut editor = sample_editor();
    editor.set_cursor(Position::new(2, 0));
    let mut session = RegionMarkers::new().with_block(block_engine());
    assert!(session.attach(&mut editor).unwrap().created.is_empty());

    let t0 = Instant::now();
    editor.set_cursor(Position::new(0, 0));
    session.pump(&mut editor, t0, false).unwrap();
    let report = session
        .tick(&mut editor, t0 + ms(100), false)
        .unwrap()
        .expect("scan after quiet period");
    assert_eq!(report.created.len(), 1);
    assert_eq!(editor.markers_with_class("test-marker").len(), 1);
}

#[test]
fn test_clicked_inline_span_stays_open_after_rescan() {
    let mut editor = MemoryEditor::from_lines(&["x $a$ y"]);
    let mut session = RegionMarkers::new().with_inline(math_engine());
    let marker = session.attach(&mut editor).unwrap().created[0];

    let outcome = dispatch_pointer(
        &mut editor,
        marker,
        PointerEvent::Click(ScreenCoords::new(24.0, 0.0)),
    );
    assert_eq!(outcome, PointerOutcome::Cleared);
    assert_eq!(editor.cursor(), Position::new(0, 3));

    // The cursor move schedules a rescan, which must leave the opened span alone.
    let t0 = Instant::now();
    assert!(session.pump(&mut editor, t0, false).unwrap().is_none());
    let report = session
        .pump(&mut editor, t0 + ms(100), false)
        .unwrap()
        .expect("scan after quiet period");
    assert!(report.created.is_empty());
    assert_eq!(report.under_cursor, 1);
    assert_eq!(editor.marker_count(), 0);
    assert_eq!(editor.display_text(|r| r.widget().clone()), "x $a$ y");

    // Moving away brings the widget back.
    editor.set_cursor(Position::new(0, 7));
    session.pump(&mut editor, t0 + ms(200), false).unwrap();
    let report = session
        .pump(&mut editor, t0 + ms(300), false)
        .unwrap()
        .expect("scan after quiet period");
    assert_eq!(report.created.len(), 1);
    assert_eq!(editor.display_text(|r| r.widget().clone()), "x a y");
}

#[test]
fn test_triggers_filter_notifications() {
    let mut editor = sample_editor();
    let mut session = RegionMarkers::new()
        .with_block(block_engine())
        .with_triggers(ChangeTriggers {
            option_change: false,
            ..ChangeTriggers::default()
        });
    session.attach(&mut editor).unwrap();

    let t0 = Instant::now();
    editor.set_option("theme", "dark");
    assert!(session.pump(&mut editor, t0, false).unwrap().is_none());
    assert!(!session.is_pending());

    editor.set_viewport(0..3);
    session.pump(&mut editor, t0, false).unwrap();
    assert!(session.is_pending());
}

#[test]
fn test_idle_policy() {
    let mut editor = sample_editor();
    let mut session = RegionMarkers::new()
        .with_block(block_engine())
        .with_policy(SchedulePolicy::Idle { max_wait: ms(1000) });
    session.attach(&mut editor).unwrap();

    let t0 = Instant::now();
    session.notify(ChangeKind::ViewportChange, t0);
    assert!(session.tick(&mut editor, t0 + ms(10), false).unwrap().is_none());
    assert!(session.tick(&mut editor, t0 + ms(20), true).unwrap().is_some());

    // Without an idle moment the scan still runs at the maximum wait.
    session.notify(ChangeKind::CursorActivity, t0 + ms(30));
    session.notify(ChangeKind::CursorActivity, t0 + ms(900));
    assert_eq!(session.deadline(), Some(t0 + ms(1030)));
    assert!(session.tick(&mut editor, t0 + ms(1029), false).unwrap().is_none());
    assert!(session.tick(&mut editor, t0 + ms(1030), false).unwrap().is_some());
    assert_eq!(session.scan_count(), 3);
}

#[test]
fn test_subscriber_feeds_session() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let mut editor = sample_editor();
    editor.subscribe(move |kind| sink.borrow_mut().push(kind));
    let mut session = RegionMarkers::new().with_block(block_engine());
    session.attach(&mut editor).unwrap();

    let t0 = Instant::now();
    editor.scroll_to(1, 4);
    editor.set_cursor(Position::new(5, 2));
    for kind in seen.borrow_mut().drain(..) {
        session.notify(kind, t0);
    }
    assert!(session.is_pending());
    assert_eq!(session.deadline(), Some(t0 + ms(100)));
}

#[test]
fn test_renderer_error_surfaces_from_tick() {
    let mut editor = sample_editor();
    let failing = BlockRegionEngine::new(
        BlockPatterns::new("^:::test$", "^:::$").unwrap(),
        |_: &PatternMatch, _: &PatternMatch, _: &str| -> Result<String, RenderError> {
            Err("no renderer".into())
        },
        "test-marker",
        InteractionMode::ClearOnClick,
    );
    let mut session = RegionMarkers::new().with_block(failing);

    assert!(matches!(
        session.attach(&mut editor),
        Err(RegionError::Render { .. })
    ));

    let t0 = Instant::now();
    session.notify(ChangeKind::CursorActivity, t0);
    let err = session.tick(&mut editor, t0 + ms(100), false).unwrap_err();
    assert_eq!(
        err.to_string(),
        "renderer for 'test-marker' failed: no renderer"
    );
    assert_eq!(session.scan_count(), 0);
    assert_eq!(editor.marker_count(), 0);
}
