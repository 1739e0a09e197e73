//! Syntax highlighting core
//!
//! This module provides the highlighting pipeline used by the editor:
//! - Tokenizing Python source into positioned tokens
//! - Classifying tokens into style categories
//! - Applying category tags to a host buffer, restricted to the viewport

mod builtins;
mod classify;
mod highlighter;
mod host;
mod lexer;
mod store;
mod style;
mod tokens;
mod viewport;

pub use classify::{Classified, Classifier, Context};
pub use highlighter::{Highlighter, PassOutcome, PassStats};
pub use host::{HostBuffer, TextSource};
pub use lexer::{tokenize, tokenize_with, LexOptions, Tokens};
pub use store::{apply_pass, RangeStore, RegionSet, StyledRange};
pub use style::{Color, Style, StyleRegistry};
pub use tokens::{Category, Position, Region, Token, TokenKind};
pub use viewport::{visible_span, LineSpan, ViewportGeometry};
