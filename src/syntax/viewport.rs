//! Viewport geometry and visible line spans
//!
//! Highlighting is restricted to the lines the host currently shows, padded
//! by a small margin for partially visible trailing lines.

use super::tokens::{Position, Region};

/// Viewport queries answered by the host
pub trait ViewportGeometry {
    /// First visible line (1-based)
    fn first_visible_line(&self) -> usize;

    /// Height of the text area in pixels
    fn viewport_height_px(&self) -> u32;

    /// Height of one line in pixels
    fn line_height_px(&self) -> u32;
}

/// Inclusive range of 1-based line numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub first: usize,
    pub last: usize,
}

impl LineSpan {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn len(&self) -> usize {
        (self.last + 1).saturating_sub(self.first)
    }

    pub fn is_empty(&self) -> bool {
        self.last < self.first
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.first && line <= self.last
    }

    /// Smallest span covering both
    pub fn union(&self, other: &LineSpan) -> LineSpan {
        LineSpan::new(self.first.min(other.first), self.last.max(other.last))
    }

    /// Region from the start of `first` to the start of the line after `last`
    pub fn region(&self) -> Region {
        Region::new(Position::new(self.first, 0), Position::new(self.last + 1, 0))
    }

    /// Lines to add to slice-relative line numbers to get buffer lines
    pub fn line_offset(&self) -> usize {
        self.first.saturating_sub(1)
    }
}

/// Compute the visible span of a buffer with `line_count` lines
pub fn visible_span<G: ViewportGeometry + ?Sized>(
    geometry: &G,
    line_count: usize,
    margin: usize,
) -> LineSpan {
    let line_count = line_count.max(1);
    let first = geometry.first_visible_line().clamp(1, line_count);
    let line_height = geometry.line_height_px().max(1);
    let rows = geometry.viewport_height_px().div_ceil(line_height).max(1) as usize;
    let last = (first + rows - 1 + margin).min(line_count);
    LineSpan::new(first, last)
}
