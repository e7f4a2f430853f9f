use std::time::{Duration, Instant};

use region_marker::{
    BlockPatterns, BlockRegionEngine, EditorHost, InlineRegionEngine, InlineRenderContext,
    InteractionMode, MemoryEditor, PatternMatch, PointerEvent, PointerOutcome, Position,
    RegionMarkers, RenderError, ScreenCoords, dispatch_pointer,
};

fn main() {
    let mut editor = MemoryEditor::from_lines(&[
        "# Notes",
        "",
        "Euler: $e^{i\\pi} + 1 = 0$, see [[identities]].",
        "",
        "```mermaid",
        "graph TD; A-->B",
        "```",
    ]);

    let diagrams = BlockRegionEngine::new(
        BlockPatterns::new(r"^```mermaid$", r"^```$").unwrap(),
        |_: &PatternMatch, _: &PatternMatch, content: &str| -> Result<String, RenderError> {
            Ok(format!("<diagram: {}>", content.trim()))
        },
        "mermaid-block",
        InteractionMode::EditButton,
    );
    let spans = InlineRegionEngine::from_regexes(
        &[r"\$([^$]+)\$", r"\[\[([^\]]+)\]\]"],
        |cx: &InlineRenderContext<'_, String>| -> Result<String, RenderError> {
            let inner = cx.matched.group(1).unwrap_or_default();
            Ok(match cx.pattern_index {
                0 => format!("<math {inner}>"),
                _ => format!("<link {inner}>"),
            })
        },
        "inline-span",
    )
    .unwrap();

    let mut session = RegionMarkers::new().with_block(diagrams).with_inline(spans);
    let report = session.attach(&mut editor).unwrap();
    assert_eq!(report.created.len(), 3);
    assert_eq!(
        editor.display_text(|r| r.widget().clone()),
        "# Notes\n\nEuler: <math e^{i\\pi} + 1 = 0>, see <link identities>.\n\n<diagram: graph TD; A-->B>"
    );

    // Hovering the diagram reveals its edit button; pressing it exposes the source.
    let diagram = editor.markers_with_class("mermaid-block")[0].id;
    dispatch_pointer(&mut editor, diagram, PointerEvent::Enter);
    let outcome = dispatch_pointer(&mut editor, diagram, PointerEvent::EditButton);
    assert_eq!(outcome, PointerOutcome::Cleared);
    assert_eq!(editor.cursor(), Position::new(5, 0));

    // Clicking the math widget puts the cursor where the pointer landed.
    let math = editor.find_marks_at(Position::new(2, 8))[0].id;
    let outcome = dispatch_pointer(
        &mut editor,
        math,
        PointerEvent::Click(ScreenCoords::new(8.0 * 9.0, 20.0 * 2.0)),
    );
    assert_eq!(outcome, PointerOutcome::Cleared);
    assert_eq!(editor.cursor(), Position::new(2, 9));

    // Once the cursor leaves the block and the debounce has passed, both widgets come back.
    let t0 = Instant::now();
    editor.set_cursor(Position::new(0, 0));
    session.pump(&mut editor, t0, false).unwrap();
    let report = session
        .pump(&mut editor, t0 + Duration::from_millis(100), false)
        .unwrap()
        .expect("debounced rescan");
    assert_eq!(report.created.len(), 2);
    println!("{}", editor.display_text(|r| r.widget().clone()));
}
