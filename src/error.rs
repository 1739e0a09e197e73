//! Error types for tagpad

use thiserror::Error;

/// Result type alias for highlighter operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighter error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// A category name outside the closed set reached the style registry
    #[error("unknown style category: {0}")]
    ClassificationPrecondition(String),

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad command line
    #[error("{0}")]
    Usage(String),
}

/// Malformed source text. Positions are 1-based lines, 0-based columns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated string literal at {line}:{col}")]
    UnterminatedString { line: usize, col: usize },

    #[error("EOF in multi-line string starting at {line}:{col}")]
    EofInString { line: usize, col: usize },

    #[error("EOF in multi-line statement at line {line}")]
    EofInStatement { line: usize },

    #[error("unindent does not match any outer indentation level at line {line}")]
    Indentation { line: usize },
}
