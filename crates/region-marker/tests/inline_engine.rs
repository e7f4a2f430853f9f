use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use region_marker::{
    EditorHost, InlineRegionEngine, InlineRenderContext, MemoryEditor, Position, RegionError,
    RenderError, Replacement,
};

const MATH: &str = r"\$([^$]+)\$";

fn upper(cx: &InlineRenderContext<'_, String>) -> Result<String, RenderError> {
    Ok(cx.matched.group(1).unwrap_or(cx.matched.as_str()).to_uppercase())
}

fn shown(editor: &MemoryEditor<String>) -> String {
    editor.display_text(|r| format!("<{}>", r.widget()))
}

#[test]
fn test_marks_every_match_on_visible_lines() {
    let mut editor = MemoryEditor::from_lines(&["$a$ and $b$", "none", "x $c$"]);
    editor.set_cursor(Position::new(1, 0));
    let mut engine = InlineRegionEngine::from_regexes(&[MATH], upper, "math").unwrap();

    let report = engine.process(&mut editor).unwrap();
    assert_eq!(report.inline_matches, 3);
    assert_eq!(report.created.len(), 3);
    assert_eq!(shown(&editor), "<A> and <B>\nnone\nx <C>");
    assert_eq!(editor.transaction_count(), 1);
}

#[test]
fn test_overlapping_patterns_replace_only_first() {
    let mut editor = MemoryEditor::from_lines(&["see [[link|$x$]] here"]);
    let mut engine = InlineRegionEngine::from_regexes(
        &[MATH, r"\[\[([^\]]+)\]\]"],
        |cx: &InlineRenderContext<'_, String>| -> Result<String, RenderError> {
            Ok(format!("p{}", cx.pattern_index))
        },
        "spans",
    )
    .unwrap();

    let report = engine.process(&mut editor).unwrap();
    assert_eq!(report.created.len(), 1);
    assert_eq!(report.rejected_overlap, 1);
    assert_eq!(shown(&editor), "see <p1> here");
}

#[test]
fn test_rescan_does_not_stack_markers() {
    let mut editor = MemoryEditor::from_lines(&["$a$ $b$", ""]);
    editor.set_cursor(Position::new(1, 0));
    let mut engine = InlineRegionEngine::from_regexes(&[MATH], upper, "math").unwrap();

    engine.process(&mut editor).unwrap();
    let report = engine.process(&mut editor).unwrap();
    assert!(report.created.is_empty());
    assert_eq!(report.already_marked, 2);
    assert_eq!(editor.marker_count(), 2);
    // Nothing new to mark: the second pass opens no transaction.
    assert_eq!(editor.transaction_count(), 1);
}

#[test]
fn test_adjacent_spans_are_both_marked() {
    let mut editor = MemoryEditor::from_lines(&["", "$a$$b$"]);
    let mut engine = InlineRegionEngine::from_regexes(&[MATH], upper, "math").unwrap();

    engine.process(&mut editor).unwrap();
    assert_eq!(shown(&editor), "\n<A><B>");

    // The second span starts where the first ends; lookups there must not count it as marked.
    let report = engine.process(&mut editor).unwrap();
    assert_eq!(report.already_marked, 2);
    assert!(report.created.is_empty());
}

#[test]
fn test_renderer_sees_previous_match_on_same_line() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);

    let mut editor = MemoryEditor::from_lines(&["$a$ $b$", "$c$", ""]);
    editor.set_cursor(Position::new(2, 0));
    let mut engine = InlineRegionEngine::from_regexes(
        &[MATH],
        move |cx: &InlineRenderContext<'_, String>| -> Result<String, RenderError> {
            seen_clone.borrow_mut().push((
                cx.from,
                cx.to,
                cx.previous.cloned(),
                cx.last_from,
                cx.last_to,
            ));
            Ok(cx.matched.as_str().to_string())
        },
        "math",
    )
    .unwrap();
    engine.process(&mut editor).unwrap();

    let seen = seen.borrow();
    assert_eq!(
        *seen,
        vec![
            (Position::new(0, 0), Position::new(0, 3), None, None, None),
            (
                Position::new(0, 4),
                Position::new(0, 7),
                Some("$a$".to_string()),
                Some(Position::new(0, 0)),
                Some(Position::new(0, 3))
            ),
            (Position::new(1, 0), Position::new(1, 3), None, None, None),
        ]
    );
}

#[test]
fn test_only_viewport_lines_are_scanned() {
    let mut editor = MemoryEditor::from_lines(&["$a$", "$b$", "$c$"]);
    editor.set_viewport(1..2);
    let mut engine = InlineRegionEngine::from_regexes(&[MATH], upper, "math").unwrap();

    engine.process(&mut editor).unwrap();
    assert_eq!(shown(&editor), "$a$\n<B>\n$c$");
}

#[test]
fn test_filter_predicate() {
    let mut editor = MemoryEditor::from_lines(&["- [ ] todo", "- [x] done", "[ ] not a task"]);
    let mut engine = InlineRegionEngine::from_regexes(
        &[r"\[( |x)\]"],
        |cx: &InlineRenderContext<'_, String>| -> Result<String, RenderError> {
            Ok(if cx.matched.group(1) == Some("x") {
                "☑".to_string()
            } else {
                "☐".to_string()
            })
        },
        "task",
    )
    .unwrap()
    .with_filter(|line, m| line.trim_start().starts_with("- ") && m.start() == 2);

    engine.process(&mut editor).unwrap();
    assert_eq!(
        editor.display_text(|r| r.widget().clone()),
        "- ☐ todo\n- ☑ done\n[ ] not a task"
    );
}

#[test]
fn test_skip_under_cursor() {
    let mut editor = MemoryEditor::from_lines(&["$a$ $b$"]);
    editor.set_cursor(Position::new(0, 5));
    let mut engine = InlineRegionEngine::from_regexes(&[MATH], upper, "math").unwrap();

    let report = engine.process(&mut editor).unwrap();
    assert_eq!(report.under_cursor, 1);
    assert_eq!(shown(&editor), "<A> $b$");

    // Once the cursor leaves the span, the next pass picks it up.
    editor.set_cursor(Position::new(0, 0));
    let report = engine.process(&mut editor).unwrap();
    assert_eq!(report.already_marked, 1);
    assert_eq!(report.created.len(), 1);
    assert_eq!(shown(&editor), "<A> <B>");
}

#[test]
fn test_span_under_cursor_replaced_when_not_skipping() {
    let mut editor = MemoryEditor::from_lines(&["$a$ $b$"]);
    editor.set_cursor(Position::new(0, 5));
    let mut engine = InlineRegionEngine::from_regexes(&[MATH], upper, "math")
        .unwrap()
        .skip_under_cursor(false);

    let report = engine.process(&mut editor).unwrap();
    assert_eq!(report.under_cursor, 0);
    assert_eq!(shown(&editor), "<A> <B>");
}

#[test]
fn test_click_flag_on_widgets() {
    let mut editor = MemoryEditor::from_lines(&["$a$", ""]);
    editor.set_cursor(Position::new(1, 0));
    let mut engine = InlineRegionEngine::from_regexes(&[MATH], upper, "math")
        .unwrap()
        .clear_on_click(false);
    let report = engine.process(&mut editor).unwrap();

    let Some(Replacement::Inline(widget)) = editor.replacement(report.created[0]) else {
        panic!("expected an inline widget");
    };
    assert!(!widget.clear_on_click);
    assert_eq!(widget.widget, "A");
}

#[test]
fn test_invalid_pattern_is_reported() {
    let err = InlineRegionEngine::<String>::from_regexes(&[MATH, "[oops"], upper, "math")
        .unwrap_err();
    assert!(matches!(err, RegionError::InvalidPattern { .. }));
}

#[test]
fn test_renderer_error_bubbles_up() {
    let mut editor = MemoryEditor::from_lines(&["", "$a$"]);
    let mut engine = InlineRegionEngine::from_regexes(
        &[MATH],
        |_: &InlineRenderContext<'_, String>| -> Result<String, RenderError> {
            Err("bad tex".into())
        },
        "math",
    )
    .unwrap();

    let err = engine.process(&mut editor).unwrap_err();
    assert_eq!(err.to_string(), "renderer for 'math' failed: bad tex");
    assert_eq!(editor.cursor(), Position::new(0, 0));
}
