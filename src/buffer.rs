//! In-memory host buffer
//!
//! `MemoryBuffer` is a line-based text buffer with a tag table and a
//! scrollable viewport. It implements every host interface the highlighter
//! needs and serves as the reference host for tests and the preview binary.

use std::collections::BTreeMap;

use crate::line::Line;
use crate::syntax::{
    Category, LineSpan, Position, RangeStore, Region, RegionSet, TextSource, ViewportGeometry,
};

const DEFAULT_LINE_HEIGHT_PX: u32 = 16;
const DEFAULT_ROWS: u32 = 24;

/// A buffer containing lines of text and their category tags
#[derive(Debug, Clone)]
pub struct MemoryBuffer {
    /// Lines of text, never empty
    lines: Vec<Line>,
    /// Tagged regions per category
    tags: BTreeMap<Category, RegionSet>,
    /// First visible line (1-based)
    top_line: usize,
    viewport_height_px: u32,
    line_height_px: u32,
}

impl MemoryBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a buffer holding `text`
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: split_lines(text),
            tags: BTreeMap::new(),
            top_line: 1,
            viewport_height_px: DEFAULT_ROWS * DEFAULT_LINE_HEIGHT_PX,
            line_height_px: DEFAULT_LINE_HEIGHT_PX,
        }
    }

    /// Whole buffer content, lines joined with `\n`
    pub fn contents(&self) -> String {
        let lines: Vec<&str> = self.lines.iter().map(Line::text).collect();
        lines.join("\n")
    }

    /// Get a line by 1-based number
    pub fn line(&self, line: usize) -> Option<&Line> {
        line.checked_sub(1).and_then(|idx| self.lines.get(idx))
    }

    /// Replace the whole content; all tags are dropped with the old text
    pub fn set_text(&mut self, text: &str) {
        self.lines = split_lines(text);
        self.tags.clear();
        self.top_line = self.top_line.min(self.lines.len());
    }

    /// Insert text at a position.
    ///
    /// Existing tags keep their coordinates; the next highlight pass
    /// recomputes syntax tags for the affected lines.
    pub fn insert(&mut self, pos: Position, text: &str) {
        let pos = self.clamp(pos);
        let idx = pos.line - 1;
        let tail = self.lines[idx].split_off(pos.col);

        let mut pieces = text.split('\n');
        if let Some(first) = pieces.next() {
            self.lines[idx].append_str(first.strip_suffix('\r').unwrap_or(first));
        }
        let mut current = idx;
        for piece in pieces {
            current += 1;
            self.lines
                .insert(current, Line::from(piece.strip_suffix('\r').unwrap_or(piece)));
        }
        self.lines[current].append_str(tail.text());
    }

    /// Delete the text covered by `region`
    pub fn delete(&mut self, region: Region) {
        let start = self.clamp(region.start);
        let end = self.clamp(region.end);
        if end <= start {
            return;
        }
        let tail = self.lines[end.line - 1].slice_from(end.col).to_string();
        self.lines.drain(start.line..end.line);
        let line = &mut self.lines[start.line - 1];
        line.truncate(start.col);
        line.append_str(&tail);
    }

    /// Scroll so that `line` is the first visible line
    pub fn scroll_to(&mut self, line: usize) {
        self.top_line = line.clamp(1, self.lines.len());
    }

    /// Resize the viewport
    pub fn set_viewport(&mut self, height_px: u32, line_height_px: u32) {
        self.viewport_height_px = height_px;
        self.line_height_px = line_height_px.max(1);
    }

    /// Categories tagged at a position
    pub fn tags_at(&self, pos: Position) -> Vec<Category> {
        self.tags
            .iter()
            .filter(|(_, set)| set.contains(pos))
            .map(|(&category, _)| category)
            .collect()
    }

    /// Text of each region tagged with `category`
    pub fn tagged_text(&self, category: Category) -> Vec<String> {
        self.ranges(category)
            .into_iter()
            .map(|region| self.text(region))
            .collect()
    }

    /// Lines that hold at least one tag of any of `categories`
    pub fn tagged_lines(&self, categories: &[Category]) -> Vec<usize> {
        let mut lines: Vec<usize> = categories
            .iter()
            .filter_map(|c| self.tags.get(c))
            .flat_map(|set| set.regions().iter())
            .flat_map(|r| {
                // A region ending at column 0 does not reach into its end line
                let last = if r.end.col == 0 && r.end.line > r.start.line {
                    r.end.line - 1
                } else {
                    r.end.line
                };
                r.start.line..=last
            })
            .collect();
        lines.sort_unstable();
        lines.dedup();
        lines
    }

    /// Lines currently visible, without margin
    pub fn visible_lines(&self) -> LineSpan {
        let rows = self.viewport_height_px.div_ceil(self.line_height_px).max(1) as usize;
        LineSpan::new(self.top_line, (self.top_line + rows - 1).min(self.lines.len()))
    }

    /// Clamp a position to the buffer
    fn clamp(&self, pos: Position) -> Position {
        let count = self.lines.len();
        if pos.line < 1 {
            return Position::new(1, 0);
        }
        if pos.line > count {
            return Position::new(count, self.lines[count - 1].char_len());
        }
        Position::new(pos.line, pos.col.min(self.lines[pos.line - 1].char_len()))
    }
}

impl Default for MemoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn split_lines(text: &str) -> Vec<Line> {
    text.split('\n')
        .map(|l| Line::from(l.strip_suffix('\r').unwrap_or(l)))
        .collect()
}

impl TextSource for MemoryBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_len(&self, line: usize) -> usize {
        self.line(line).map_or(0, Line::char_len)
    }

    fn text(&self, region: Region) -> String {
        let start = self.clamp(region.start);
        let end = self.clamp(region.end);
        if end <= start {
            return String::new();
        }
        if start.line == end.line {
            return self.lines[start.line - 1]
                .slice_cols(start.col, end.col)
                .to_string();
        }

        let mut out = self.lines[start.line - 1].slice_from(start.col).to_string();
        for line in &self.lines[start.line..end.line - 1] {
            out.push('\n');
            out.push_str(line.text());
        }
        out.push('\n');
        out.push_str(self.lines[end.line - 1].slice_cols(0, end.col));
        out
    }
}

impl RangeStore for MemoryBuffer {
    fn clear(&mut self, categories: &[Category], region: Region) {
        for category in categories {
            if let Some(set) = self.tags.get_mut(category) {
                set.remove(region);
                if set.is_empty() {
                    self.tags.remove(category);
                }
            }
        }
    }

    fn apply(&mut self, category: Category, region: Region) {
        if region.is_empty() {
            return;
        }
        self.tags.entry(category).or_default().insert(region);
    }

    fn ranges(&self, category: Category) -> Vec<Region> {
        self.tags
            .get(&category)
            .map(|set| set.regions().to_vec())
            .unwrap_or_default()
    }

    fn categories(&self) -> Vec<Category> {
        self.tags.keys().copied().collect()
    }

    fn clear_category(&mut self, category: Category) {
        self.tags.remove(&category);
    }
}

impl ViewportGeometry for MemoryBuffer {
    fn first_visible_line(&self) -> usize {
        self.top_line
    }

    fn viewport_height_px(&self) -> u32 {
        self.viewport_height_px
    }

    fn line_height_px(&self) -> u32 {
        self.line_height_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, col: usize) -> Position {
        Position::new(line, col)
    }

    #[test]
    fn test_from_text_lines() {
        let buffer = MemoryBuffer::from_text("a\r\nbc\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(2).unwrap().text(), "bc");
        assert_eq!(buffer.line_len(3), 0);
        assert_eq!(buffer.line_len(9), 0);
        assert_eq!(MemoryBuffer::new().line_count(), 1);
    }

    #[test]
    fn test_text_ranges() {
        let buffer = MemoryBuffer::from_text("first\nsecond\nthird");
        assert_eq!(buffer.text(Region::new(pos(1, 1), pos(1, 3))), "ir");
        assert_eq!(buffer.text(Region::new(pos(1, 3), pos(3, 2))), "st\nsecond\nth");
        assert_eq!(buffer.text(Region::new(pos(2, 0), pos(3, 0))), "second\n");
        // Past the end clamps to the last line
        assert_eq!(buffer.text(Region::new(pos(3, 0), pos(4, 0))), "third");
        assert_eq!(buffer.text(Region::new(pos(2, 0), pos(1, 0))), "");
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = MemoryBuffer::from_text("def f():\n    pass");
        buffer.insert(pos(1, 8), "\n    x = 1");
        assert_eq!(buffer.contents(), "def f():\n    x = 1\n    pass");
        buffer.delete(Region::new(pos(1, 8), pos(2, 9)));
        assert_eq!(buffer.contents(), "def f():\n    pass");
        buffer.insert(pos(2, 4), "return ");
        assert_eq!(buffer.contents(), "def f():\n    return pass");
    }

    #[test]
    fn test_tag_store() {
        let mut buffer = MemoryBuffer::from_text("import os");
        let keyword = Region::new(pos(1, 0), pos(1, 6));
        buffer.apply(Category::Keyword, keyword);
        buffer.apply(Category::Keyword, keyword);
        assert_eq!(buffer.ranges(Category::Keyword), vec![keyword]);
        assert_eq!(buffer.tags_at(pos(1, 2)), vec![Category::Keyword]);
        assert_eq!(buffer.tagged_text(Category::Keyword), vec!["import"]);

        buffer.clear(&[Category::Keyword], Region::new(pos(1, 0), pos(2, 0)));
        assert!(buffer.categories().is_empty());
    }

    #[test]
    fn test_clear_only_named_categories() {
        let mut buffer = MemoryBuffer::from_text("x = 1");
        buffer.apply(Category::Number, Region::new(pos(1, 4), pos(1, 5)));
        buffer.apply(Category::Highlight, Region::new(pos(1, 0), pos(1, 5)));
        buffer.clear(&Category::PASS, Region::new(pos(1, 0), pos(2, 0)));
        assert_eq!(buffer.categories(), vec![Category::Highlight]);
    }

    #[test]
    fn test_set_text_drops_tags() {
        let mut buffer = MemoryBuffer::from_text("x");
        buffer.apply(Category::Error, Region::new(pos(1, 0), pos(1, 1)));
        buffer.set_text("y\nz");
        assert!(buffer.categories().is_empty());
        assert_eq!(buffer.line_count(), 2);
    }

    #[test]
    fn test_viewport() {
        let text = vec!["x"; 100].join("\n");
        let mut buffer = MemoryBuffer::from_text(&text);
        buffer.set_viewport(160, 16);
        buffer.scroll_to(50);
        assert_eq!(buffer.first_visible_line(), 50);
        assert_eq!(buffer.visible_lines(), LineSpan::new(50, 59));
        buffer.scroll_to(500);
        assert_eq!(buffer.first_visible_line(), 100);
        assert_eq!(buffer.visible_lines(), LineSpan::new(100, 100));
    }
}
