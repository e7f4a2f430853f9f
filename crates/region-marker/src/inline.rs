//! Inline Region Engine.
//!
//! Replaces single-line spans matched by one or more patterns with inline widgets. Matches of
//! every pattern on a line are ordered by start column (then end column, then pattern index)
//! and accepted greedily: a match that starts before the end of the previously accepted one is
//! left as plain text.

use std::fmt;

use log::{debug, trace};

use crate::error::{RegionError, RenderError};
use crate::host::{EditorHost, MarkOptions};
use crate::pattern::{LinePattern, PatternMatch, compile};
use crate::position::Position;
use crate::session::ScanReport;
use crate::widget::{InlineWidget, Replacement};

/// Everything an inline renderer gets to see about one accepted match.
#[derive(Debug)]
pub struct InlineRenderContext<'a, W> {
    /// The match and its capture groups.
    pub matched: &'a PatternMatch,
    /// Index of the pattern that produced the match.
    pub pattern_index: usize,
    /// Start of the replaced span.
    pub from: Position,
    /// End of the replaced span.
    pub to: Position,
    /// Copy of the widget rendered for the previous accepted match on this line.
    pub previous: Option<&'a W>,
    /// Start of the previous accepted match on this line.
    pub last_from: Option<Position>,
    /// End of the previous accepted match on this line.
    pub last_to: Option<Position>,
}

/// Renders the widget for one inline match.
pub trait InlineRenderer<W> {
    /// Produce a widget for the match described by `cx`.
    fn render(&mut self, cx: &InlineRenderContext<'_, W>) -> Result<W, RenderError>;
}

impl<W, F> InlineRenderer<W> for F
where
    F: FnMut(&InlineRenderContext<'_, W>) -> Result<W, RenderError>,
{
    fn render(&mut self, cx: &InlineRenderContext<'_, W>) -> Result<W, RenderError> {
        self(cx)
    }
}

type MatchFilter = Box<dyn Fn(&str, &PatternMatch) -> bool>;

/// An accepted inline span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMatch {
    /// Line of the span.
    pub line: usize,
    /// Start column.
    pub from: usize,
    /// End column (exclusive).
    pub to: usize,
    /// Index of the pattern that matched.
    pub pattern_index: usize,
    /// The match itself.
    pub matched: PatternMatch,
}

#[derive(Debug)]
enum Planned {
    Existing(InlineMatch),
    UnderCursor(InlineMatch),
    New(InlineMatch),
}

/// Detects inline spans and marks them with rendered widgets.
pub struct InlineRegionEngine<W> {
    patterns: Vec<Box<dyn LinePattern>>,
    renderer: Box<dyn InlineRenderer<W>>,
    class_name: String,
    filter: Option<MatchFilter>,
    clear_on_click: bool,
    skip_under_cursor: bool,
}

impl<W: Clone> InlineRegionEngine<W> {
    /// Create an engine from already built matchers, tried in order.
    pub fn new(
        patterns: Vec<Box<dyn LinePattern>>,
        renderer: impl InlineRenderer<W> + 'static,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            patterns,
            renderer: Box::new(renderer),
            class_name: class_name.into(),
            filter: None,
            clear_on_click: true,
            skip_under_cursor: true,
        }
    }

    /// Create an engine from regex sources.
    pub fn from_regexes(
        patterns: &[&str],
        renderer: impl InlineRenderer<W> + 'static,
        class_name: impl Into<String>,
    ) -> Result<Self, RegionError> {
        let patterns = patterns
            .iter()
            .map(|p| compile(p).map(|re| Box::new(re) as Box<dyn LinePattern>))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns, renderer, class_name))
    }

    /// Only consider matches for which `filter(line, match)` holds.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &PatternMatch) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Whether clicking a widget clears it (default `true`).
    pub fn clear_on_click(mut self, enabled: bool) -> Self {
        self.clear_on_click = enabled;
        self
    }

    /// Leave spans containing the cursor as text (default `true`).
    ///
    /// With this off, a span opened by a click is hidden again by the next rescan.
    pub fn skip_under_cursor(mut self, enabled: bool) -> Self {
        self.skip_under_cursor = enabled;
        self
    }

    /// Marker class tag.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Accepted, non-overlapping matches on one line of text.
    pub fn line_matches(&self, line: usize, text: &str) -> (Vec<InlineMatch>, usize) {
        let mut candidates: Vec<InlineMatch> = Vec::new();
        for (pattern_index, pattern) in self.patterns.iter().enumerate() {
            for matched in pattern.find_all(text) {
                if matched.is_empty() {
                    continue;
                }
                if let Some(filter) = self.filter.as_ref()
                    && !filter(text, &matched)
                {
                    continue;
                }
                candidates.push(InlineMatch {
                    line,
                    from: matched.start(),
                    to: matched.end(),
                    pattern_index,
                    matched,
                });
            }
        }
        candidates.sort_by_key(|m| (m.from, m.to, m.pattern_index));

        let mut accepted = Vec::with_capacity(candidates.len());
        let mut rejected = 0;
        let mut last_end: Option<usize> = None;
        for candidate in candidates {
            if last_end.is_some_and(|end| candidate.from < end) {
                trace!(
                    "[{}] line {line}: {:?} overlaps previous match",
                    self.class_name,
                    candidate.matched.as_str()
                );
                rejected += 1;
                continue;
            }
            last_end = Some(candidate.to);
            accepted.push(candidate);
        }
        (accepted, rejected)
    }

    fn plan<E>(&self, editor: &E, report: &mut ScanReport) -> Vec<Planned>
    where
        E: EditorHost<Widget = W>,
    {
        let viewport = editor.viewport().clamp_to(editor.line_count());
        let cursor = editor.cursor();
        let mut plan = Vec::new();

        for i in viewport.lines() {
            let Some(text) = editor.line(i) else {
                break;
            };
            let (accepted, rejected) = self.line_matches(i, &text);
            report.rejected_overlap += rejected;
            report.inline_matches += accepted.len();

            for m in accepted {
                let from = Position::new(i, m.from);
                let existing = editor
                    .find_marks_at(from)
                    .iter()
                    .any(|marker| marker.class_name == self.class_name && marker.from == from);
                if existing {
                    report.already_marked += 1;
                    plan.push(Planned::Existing(m));
                } else if self.skip_under_cursor
                    && cursor.line == i
                    && m.from <= cursor.column
                    && cursor.column <= m.to
                {
                    report.under_cursor += 1;
                    plan.push(Planned::UnderCursor(m));
                } else {
                    plan.push(Planned::New(m));
                }
            }
        }
        plan
    }

    /// Scan the viewport and mark every new inline span.
    pub fn process<E>(&mut self, editor: &mut E) -> Result<ScanReport, RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        let mut report = ScanReport::default();
        let plan = self.plan(editor, &mut report);

        if !plan.iter().any(|p| matches!(p, Planned::New(_))) {
            return Ok(report);
        }

        editor.operation(|editor| self.mark_spans(editor, plan, &mut report))?;

        debug!(
            "[{}] {} inline matches, {} marked, {} already marked, {} overlapping",
            self.class_name,
            report.inline_matches,
            report.created.len(),
            report.already_marked,
            report.rejected_overlap
        );
        Ok(report)
    }

    fn mark_spans<E>(
        &mut self,
        editor: &mut E,
        plan: Vec<Planned>,
        report: &mut ScanReport,
    ) -> Result<(), RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        let mut current_line = None;
        let mut previous: Option<W> = None;
        let mut last: Option<(Position, Position)> = None;

        for planned in plan {
            let (m, is_new) = match planned {
                Planned::New(m) => (m, true),
                Planned::Existing(m) | Planned::UnderCursor(m) => (m, false),
            };
            if current_line != Some(m.line) {
                current_line = Some(m.line);
                previous = None;
                last = None;
            }

            let from = Position::new(m.line, m.from);
            let to = Position::new(m.line, m.to);
            if !is_new {
                // The span is accepted but its widget, if any, is not ours to copy.
                previous = None;
                last = Some((from, to));
                continue;
            }

            let cx = InlineRenderContext {
                matched: &m.matched,
                pattern_index: m.pattern_index,
                from,
                to,
                previous: previous.as_ref(),
                last_from: last.map(|(f, _)| f),
                last_to: last.map(|(_, t)| t),
            };
            let widget = self
                .renderer
                .render(&cx)
                .map_err(|source| RegionError::Render {
                    class_name: self.class_name.clone(),
                    source,
                })?;

            previous = Some(widget.clone());
            last = Some((from, to));

            let replacement = Replacement::Inline(InlineWidget {
                widget,
                clear_on_click: self.clear_on_click,
            });
            let id = editor.mark_text(
                from,
                to,
                MarkOptions::replace(replacement, self.class_name.clone()),
            );
            report.created.push(id);
        }
        Ok(())
    }
}

impl<W> fmt::Debug for InlineRegionEngine<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineRegionEngine")
            .field("patterns", &self.patterns.len())
            .field("class_name", &self.class_name)
            .field("clear_on_click", &self.clear_on_click)
            .field("skip_under_cursor", &self.skip_under_cursor)
            .finish_non_exhaustive()
    }
}
