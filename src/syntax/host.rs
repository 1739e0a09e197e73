//! Host buffer interfaces
//!
//! The highlighter reads text and viewport geometry from its host and
//! writes category tags back. It never modifies buffer content.

use super::store::RangeStore;
use super::tokens::Region;
use super::viewport::ViewportGeometry;

/// Read access to buffer text
pub trait TextSource {
    /// Number of lines, at least 1
    fn line_count(&self) -> usize;

    /// Length of a line in chars, 0 past the end of the buffer
    fn line_len(&self, line: usize) -> usize;

    /// Text covered by `region`, lines joined with `\n`; clamped to the buffer
    fn text(&self, region: Region) -> String;
}

/// Everything a highlighter needs from the buffer it is attached to
pub trait HostBuffer: TextSource + RangeStore + ViewportGeometry {}

impl<T: TextSource + RangeStore + ViewportGeometry> HostBuffer for T {}
