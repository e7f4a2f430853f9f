//! Block Region Engine.
//!
//! Detects regions bounded by a begin-delimiter line and an end-delimiter line inside the
//! viewport, and replaces each one with a [`BlockContainer`] holding a rendered widget.
//!
//! # Scan
//!
//! The viewport is walked top to bottom with a two-state machine (outside / inside a block).
//! While outside, a line matching the begin pattern opens a block. While inside, only the end
//! pattern is considered, so a second begin line never opens a nested block (the first begin
//! wins). If the viewport ends inside a block, the scan continues below the viewport until an end
//! line or the end of the document; an unterminated block produces no match.
//!
//! # Marking
//!
//! All matches of one pass are marked inside a single [`EditorHost::operation`]. A match is
//! skipped when a marker with the engine's class already touches its first character, or when the
//! cursor line lies within the block, so the region being edited is never hidden.

use std::fmt;

use log::{debug, trace};

use crate::error::{RegionError, RenderError};
use crate::host::{EditorHost, MarkOptions, MarkerId};
use crate::pattern::{LinePattern, PatternMatch, compile};
use crate::position::Position;
use crate::session::ScanReport;
use crate::widget::{BlockContainer, InteractionMode, Replacement};

/// Renders the widget for one block region.
pub trait BlockRenderer<W> {
    /// Produce a widget from the delimiter matches and the joined content lines.
    fn render(
        &mut self,
        begin: &PatternMatch,
        end: &PatternMatch,
        content: &str,
    ) -> Result<W, RenderError>;
}

impl<W, F> BlockRenderer<W> for F
where
    F: FnMut(&PatternMatch, &PatternMatch, &str) -> Result<W, RenderError>,
{
    fn render(
        &mut self,
        begin: &PatternMatch,
        end: &PatternMatch,
        content: &str,
    ) -> Result<W, RenderError> {
        self(begin, end, content)
    }
}

/// Delimiter patterns of a block engine.
pub struct BlockPatterns {
    begin: Box<dyn LinePattern>,
    end: Box<dyn LinePattern>,
    content: Option<Box<dyn LinePattern>>,
}

impl BlockPatterns {
    /// Compile begin and end regexes.
    pub fn new(begin: &str, end: &str) -> Result<Self, RegionError> {
        Ok(Self::from_matchers(compile(begin)?, compile(end)?))
    }

    /// Use arbitrary matchers.
    pub fn from_matchers(
        begin: impl LinePattern + 'static,
        end: impl LinePattern + 'static,
    ) -> Self {
        Self {
            begin: Box::new(begin),
            end: Box::new(end),
            content: None,
        }
    }

    /// Attach a content regex (matched against the joined content lines).
    pub fn with_content(mut self, content: &str) -> Result<Self, RegionError> {
        self.content = Some(Box::new(compile(content)?));
        Ok(self)
    }

    /// Attach a content matcher.
    pub fn with_content_matcher(mut self, content: impl LinePattern + 'static) -> Self {
        self.content = Some(Box::new(content));
        self
    }

    /// Whether a content matcher is configured.
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }
}

impl fmt::Debug for BlockPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockPatterns")
            .field("has_content", &self.has_content())
            .finish_non_exhaustive()
    }
}

/// A detected block region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch {
    /// Line of the begin delimiter.
    pub from: usize,
    /// Line of the end delimiter.
    pub to: usize,
    /// Begin delimiter match.
    pub begin: PatternMatch,
    /// End delimiter match.
    pub end: PatternMatch,
}

impl BlockMatch {
    /// Whether `line` lies within the delimiters (inclusive).
    pub fn contains_line(&self, line: usize) -> bool {
        self.from <= line && line <= self.to
    }

    /// Number of content lines between the delimiters.
    pub fn content_line_count(&self) -> usize {
        self.to.saturating_sub(self.from + 1)
    }
}

/// Detects block regions and marks them with rendered widgets.
pub struct BlockRegionEngine<W> {
    patterns: BlockPatterns,
    renderer: Box<dyn BlockRenderer<W>>,
    class_name: String,
    mode: InteractionMode,
    gate_on_content: bool,
}

impl<W> BlockRegionEngine<W> {
    /// Create an engine.
    pub fn new(
        patterns: BlockPatterns,
        renderer: impl BlockRenderer<W> + 'static,
        class_name: impl Into<String>,
        mode: InteractionMode,
    ) -> Self {
        Self {
            patterns,
            renderer: Box::new(renderer),
            class_name: class_name.into(),
            mode,
            gate_on_content: false,
        }
    }

    /// Only keep matches whose joined content satisfies the content matcher.
    ///
    /// Has no effect when no content matcher is configured.
    pub fn gate_on_content(mut self, enabled: bool) -> Self {
        self.gate_on_content = enabled;
        self
    }

    /// Marker class tag.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Interaction mode of created containers.
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Find block regions in the current viewport.
    pub fn scan<E>(&self, editor: &E) -> Vec<BlockMatch>
    where
        E: EditorHost<Widget = W>,
    {
        let line_count = editor.line_count();
        let viewport = editor.viewport().clamp_to(line_count);

        let mut matches = Vec::new();
        let mut open: Option<(usize, PatternMatch)> = None;

        for i in viewport.lines() {
            let Some(line) = editor.line(i) else {
                break;
            };
            trace!("[{}] scanning line {i}: {line:?}", self.class_name);

            match open.take() {
                None => {
                    if let Some(begin) = self.patterns.begin.captures(&line) {
                        open = Some((i, begin));
                    }
                }
                Some((from, begin)) => {
                    if let Some(end) = self.patterns.end.captures(&line) {
                        matches.push(BlockMatch {
                            from,
                            to: i,
                            begin,
                            end,
                        });
                    } else {
                        open = Some((from, begin));
                    }
                }
            }
        }

        // The end delimiter may lie below the viewport.
        if let Some((from, begin)) = open {
            for i in viewport.to..line_count {
                let Some(line) = editor.line(i) else {
                    break;
                };
                if let Some(end) = self.patterns.end.captures(&line) {
                    matches.push(BlockMatch {
                        from,
                        to: i,
                        begin,
                        end,
                    });
                    break;
                }
            }
        }

        if self.gate_on_content
            && let Some(content_pattern) = self.patterns.content.as_ref()
        {
            matches.retain(|m| content_pattern.is_match(&content_of(editor, m)));
        }

        matches
    }

    /// Scan the viewport and mark every new, cursor-free region.
    pub fn process<E>(&mut self, editor: &mut E) -> Result<ScanReport, RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        let matches = self.scan(editor);
        let mut report = ScanReport {
            block_matches: matches.len(),
            ..ScanReport::default()
        };

        if matches.is_empty() {
            return Ok(report);
        }

        editor.operation(|editor| self.mark_ranges(editor, &matches, &mut report))?;

        debug!(
            "[{}] {} block matches, {} marked, {} already marked, {} under cursor",
            self.class_name,
            report.block_matches,
            report.created.len(),
            report.already_marked,
            report.under_cursor
        );
        Ok(report)
    }

    fn mark_ranges<E>(
        &mut self,
        editor: &mut E,
        matches: &[BlockMatch],
        report: &mut ScanReport,
    ) -> Result<(), RegionError>
    where
        E: EditorHost<Widget = W>,
    {
        for block in matches {
            let from = Position::new(block.from, 0);
            let marked = editor
                .find_marks_at(from)
                .iter()
                .any(|marker| marker.class_name == self.class_name);
            if marked {
                report.already_marked += 1;
                continue;
            }

            if block.contains_line(editor.cursor().line) {
                trace!(
                    "[{}] block {}..={} holds the cursor",
                    self.class_name, block.from, block.to
                );
                report.under_cursor += 1;
                continue;
            }

            let end_len = editor
                .line(block.to)
                .map(|line| line.chars().count())
                .unwrap_or(0);
            let to = Position::new(block.to, end_len + 1);

            let content = content_of(editor, block);
            let widget = self
                .renderer
                .render(&block.begin, &block.end, &content)
                .map_err(|source| RegionError::Render {
                    class_name: self.class_name.clone(),
                    source,
                })?;

            let container = BlockContainer::new(widget, self.mode);
            let id: MarkerId = editor.mark_text(
                from,
                to,
                MarkOptions::replace(Replacement::Block(container), self.class_name.clone()),
            );
            report.created.push(id);
        }
        Ok(())
    }
}

impl<W> fmt::Debug for BlockRegionEngine<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockRegionEngine")
            .field("class_name", &self.class_name)
            .field("mode", &self.mode)
            .field("gate_on_content", &self.gate_on_content)
            .finish_non_exhaustive()
    }
}

/// Lines strictly between the delimiters, joined with `\n`.
fn content_of<E: EditorHost>(editor: &E, block: &BlockMatch) -> String {
    ((block.from + 1)..block.to)
        .filter_map(|i| editor.line(i))
        .collect::<Vec<_>>()
        .join("\n")
}
