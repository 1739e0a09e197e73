//! tagpad - incremental syntax highlighting for a minimal text editor
//!
//! The highlighter tokenizes the visible slice of a buffer on every edit,
//! classifies tokens into style categories and writes them back to the
//! buffer as tags. Everything the highlighter needs from its host is behind
//! the `TextSource`, `RangeStore` and `ViewportGeometry` traits;
//! `MemoryBuffer` is the in-memory reference host.

pub mod buffer;
pub mod config;
pub mod error;
pub mod line;
pub mod syntax;

pub use buffer::MemoryBuffer;
pub use config::Config;
pub use error::{HighlightError, LexError, Result};
pub use syntax::{Category, Highlighter, PassOutcome, Position, Region};
