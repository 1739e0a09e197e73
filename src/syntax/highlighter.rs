//! Incremental, viewport-scoped highlighting
//!
//! A `Highlighter` is attached to one host buffer for the buffer's lifetime.
//! Every `on_text_changed` call re-highlights only the visible lines:
//!
//! 1. compute the visible line span (plus margin) from the host viewport
//! 2. extract that slice of text and tokenize it
//! 3. classify tokens into styled ranges, offset to buffer lines
//! 4. clear stale syntax tags and apply the new ranges
//!
//! A lex error anywhere in the slice skips the pass and leaves the buffer's
//! tags as they were. Syntax tags only ever exist inside the most recently
//! highlighted span: each pass clears the previous span as well as its own.

use crate::config::Config;
use crate::error::{LexError, Result};
use super::classify::{Classified, Classifier};
use super::host::HostBuffer;
use super::lexer::{tokenize, tokenize_with, LexOptions};
use super::store::{apply_pass, StyledRange};
use super::style::{Style, StyleRegistry};
use super::tokens::{Category, Position, Region, TokenKind};
use super::viewport::{visible_span, LineSpan};

/// What a highlight pass did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Tags were replaced for the span in the stats
    Applied(PassStats),
    /// The slice did not lex; tags were left untouched
    Skipped(LexError),
    /// Highlighting is switched off
    Disabled,
}

impl PassOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, PassOutcome::Applied(_))
    }
}

/// Work done by one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// Buffer lines tokenized
    pub span: LineSpan,
    pub tokens: usize,
    pub ranges: usize,
    pub multiline_strings: usize,
}

/// Syntax highlighter bound to a single host buffer
pub struct Highlighter<B: HostBuffer> {
    buffer: B,
    styles: StyleRegistry,
    classifier: Classifier,
    margin: usize,
    enabled: bool,
    /// Multi-line strings seen by earlier passes, in buffer coordinates.
    /// Advisory only: edits since the pass that recorded them are not tracked.
    multiline_strings: Vec<Region>,
    /// Span of the last applied pass
    highlighted: Option<LineSpan>,
    last_pass: Option<PassStats>,
}

impl<B: HostBuffer> Highlighter<B> {
    /// Attach a highlighter with default configuration
    pub fn new(buffer: B) -> Result<Self> {
        Self::attach(buffer, &Config::default())
    }

    /// Attach a highlighter to `buffer`
    ///
    /// Scans the buffer once for multi-line strings so that the first pass
    /// knows where they are, wherever the viewport starts.
    pub fn attach(buffer: B, config: &Config) -> Result<Self> {
        let mut highlighter = Self {
            buffer,
            styles: config.registry()?,
            classifier: Classifier::new()?,
            margin: config.viewport_margin,
            enabled: config.enabled,
            multiline_strings: Vec::new(),
            highlighted: None,
            last_pass: None,
        };
        highlighter.scan_strings();
        Ok(highlighter)
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// Detach, returning the host buffer with its tags
    pub fn into_inner(self) -> B {
        self.buffer
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    pub fn style_of(&self, category: Category) -> Style {
        self.styles.style_of(category)
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Multi-line string regions recorded by earlier passes
    pub fn multiline_strings(&self) -> &[Region] {
        &self.multiline_strings
    }

    /// Statistics of the last applied pass
    pub fn last_pass(&self) -> Option<&PassStats> {
        self.last_pass.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Toggle syntax highlighting on/off
    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Rebuild the multi-line string cache from the whole buffer.
    ///
    /// Only string boundaries are tracked; nothing is classified or tagged.
    /// The scan stops at the first lex error. Hosts that replace the whole
    /// content call this again before the next pass.
    pub fn scan_strings(&mut self) -> usize {
        let span = LineSpan::new(1, self.buffer.line_count().max(1));
        let text = self.buffer.text(span.region());
        self.multiline_strings = tokenize(&text)
            .map_while(|token| token.ok())
            .filter(|token| token.kind == TokenKind::String && token.is_multiline())
            .map(|token| token.region())
            .collect();
        tracing::debug!(strings = self.multiline_strings.len(), "scanned multi-line strings");
        self.multiline_strings.len()
    }

    /// Re-highlight the visible lines after an edit, scroll or resize
    pub fn on_text_changed(&mut self) -> PassOutcome {
        let span = visible_span(&self.buffer, self.buffer.line_count(), self.margin);
        self.highlight_span(span)
    }

    /// Highlight the whole buffer, e.g. right after attaching or loading
    pub fn highlight_all(&mut self) -> PassOutcome {
        let span = LineSpan::new(1, self.buffer.line_count().max(1));
        self.highlight_span(span)
    }

    fn highlight_span(&mut self, span: LineSpan) -> PassOutcome {
        if !self.enabled {
            return PassOutcome::Disabled;
        }

        let mut span = self.extend_over_strings(span);
        let (span, classified) = match self.classify_span(span) {
            Ok(classified) => (span, classified),
            Err(LexError::EofInString { line, col }) if span.last < self.buffer.line_count() => {
                // The slice may end inside a string that closes further down
                let start = Position::new(line, col).offset_lines(span.line_offset());
                match self.find_string_end(start, span.last) {
                    Some(last) => {
                        span.last = last;
                        match self.classify_span(span) {
                            Ok(classified) => (span, classified),
                            Err(err) => return self.skip(span, err),
                        }
                    }
                    None => return self.skip(span, LexError::EofInString { line, col }),
                }
            }
            Err(err) => return self.skip(span, err),
        };

        let offset = span.line_offset();
        let ranges: Vec<StyledRange> = classified
            .ranges
            .into_iter()
            .map(|range| range.offset_lines(offset))
            .collect();
        let strings: Vec<Region> = classified
            .multiline_strings
            .into_iter()
            .map(|region| region.offset_lines(offset))
            .collect();

        let stale = self.highlighted.map_or(span, |previous| previous.union(&span));
        apply_pass(&mut self.buffer, stale.region(), &ranges);
        self.highlighted = Some(span);

        let stats = PassStats {
            span,
            tokens: classified.token_count,
            ranges: ranges.len(),
            multiline_strings: strings.len(),
        };
        self.record_strings(span, strings);
        self.last_pass = Some(stats);

        tracing::debug!(
            first = span.first,
            last = span.last,
            tokens = stats.tokens,
            ranges = stats.ranges,
            "highlight pass"
        );
        PassOutcome::Applied(stats)
    }

    fn classify_span(&self, span: LineSpan) -> std::result::Result<Classified, LexError> {
        let text = self.buffer.text(span.region());
        let options = LexOptions {
            check_indentation: span.first == 1,
            partial_end: span.last < self.buffer.line_count(),
        };
        self.classifier.styled_ranges(tokenize_with(&text, options), &text)
    }

    fn skip(&self, span: LineSpan, err: LexError) -> PassOutcome {
        tracing::debug!(first = span.first, last = span.last, error = %err, "skipping highlight pass");
        PassOutcome::Skipped(err)
    }

    /// Widen `span` so it does not start or end inside a known multi-line string
    fn extend_over_strings(&self, mut span: LineSpan) -> LineSpan {
        for region in &self.multiline_strings {
            let (start, end) = (region.start.line, region.end.line);
            if start < span.first && end >= span.first {
                span.first = start;
            }
            if start <= span.last && end > span.last {
                span.last = end.min(self.buffer.line_count());
            }
        }
        span
    }

    /// Line holding the closing delimiter of the string opened at `start`
    fn find_string_end(&self, start: Position, after: usize) -> Option<usize> {
        let head = self.buffer.text(Region::new(
            start,
            Position::new(start.line, start.col + 5),
        ));
        let body = head.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let delimiter = ["\"\"\"", "'''"].into_iter().find(|d| body.starts_with(d))?;
        (after + 1..=self.buffer.line_count()).find(|&line| {
            let text = self.buffer.text(LineSpan::new(line, line).region());
            text.contains(delimiter)
        })
    }

    /// Replace cached strings that start inside `span` with fresh ones
    fn record_strings(&mut self, span: LineSpan, strings: Vec<Region>) {
        self.multiline_strings
            .retain(|region| !span.contains(region.start.line));
        self.multiline_strings.extend(strings);
        self.multiline_strings.sort_by_key(|region| region.start);
    }

    /// Mark a whole line as faulty, replacing any previous error line
    pub fn highlight_error_line(&mut self, line: usize) {
        self.buffer.clear_category(Category::Error);
        if let Some(region) = self.line_region(line) {
            tracing::trace!(line, "error line");
            self.buffer.apply(Category::Error, region);
        }
    }

    /// Remove the error line marker
    pub fn clear_error(&mut self) {
        self.buffer.clear_category(Category::Error);
    }

    /// Move the current-line overlay to `line`
    pub fn highlight_line(&mut self, line: usize) {
        self.buffer.clear_category(Category::CurrentLine);
        if let Some(region) = self.line_region(line) {
            self.buffer.apply(Category::CurrentLine, region);
        }
    }

    /// Add the highlight overlay over `[start, end)`
    pub fn highlight_range(&mut self, start: Position, end: Position) {
        tracing::trace!(%start, %end, "highlight range");
        self.buffer.apply(Category::Highlight, Region::new(start, end));
    }

    /// Remove every highlight overlay
    pub fn clear_highlight(&mut self) {
        self.buffer.clear_category(Category::Highlight);
    }

    fn line_region(&self, line: usize) -> Option<Region> {
        (1..=self.buffer.line_count())
            .contains(&line)
            .then(|| LineSpan::new(line, line).region())
    }
}
