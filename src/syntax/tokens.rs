//! Token and category types for syntax highlighting
//!
//! This module defines the lexical tokens produced by the tokenizer,
//! the buffer coordinates they are addressed by, and the closed set of
//! semantic categories that tokens are classified into.

use std::fmt;

/// A position in a text buffer: 1-based line, 0-based column in chars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Shift this position down by `lines` lines, keeping the column
    pub fn offset_lines(self, lines: usize) -> Self {
        Self {
            line: self.line + lines,
            col: self.col,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.col)
    }
}

/// A half-open range of buffer positions `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub start: Position,
    pub end: Position,
}

impl Region {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check if this region contains a position
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }

    /// Check if two regions share at least one position
    pub fn overlaps(&self, other: &Region) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn offset_lines(self, lines: usize) -> Self {
        Self {
            start: self.start.offset_lines(lines),
            end: self.end.offset_lines(lines),
        }
    }
}

/// Lexical token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifiers and keywords
    Name,
    /// String literals, including any prefix (r"", b'', f"""...""")
    String,
    /// Numeric literals
    Number,
    /// `#` comments, up to but excluding the newline
    Comment,
    /// Operators and punctuation
    Operator,
    /// Characters that form no valid token
    Other,
}

/// A lexical token with its source span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
    /// Exclusive end position
    pub end: Position,
}

impl Token {
    pub fn region(&self) -> Region {
        Region::new(self.start, self.end)
    }

    /// True when the token starts and ends on different lines
    pub fn is_multiline(&self) -> bool {
        self.start.line != self.end.line
    }
}

/// Semantic style categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Reserved words (if, def, class, ...)
    Keyword,
    /// Builtin names, `self`/`cls`, and dunder names
    Builtin,
    /// Ordinary string literals
    String,
    /// Triple-quoted or multi-line string literals
    Docstring,
    Comment,
    Number,
    /// Name being defined by `def`
    Function,
    /// Name being defined by `class`
    Class,
    /// `@name` decorator spans
    Decorator,
    Operator,
    /// Line flagged by an external collaborator (run, lint)
    Error,
    /// Overlay: the cursor line
    CurrentLine,
    /// Overlay: transient emphasis such as search matches
    Highlight,
    /// Plain text (never applied as a tag)
    Default,
}

impl Category {
    pub const COUNT: usize = 14;

    /// Every category, in declaration order
    pub const ALL: [Category; Category::COUNT] = [
        Category::Keyword,
        Category::Builtin,
        Category::String,
        Category::Docstring,
        Category::Comment,
        Category::Number,
        Category::Function,
        Category::Class,
        Category::Decorator,
        Category::Operator,
        Category::Error,
        Category::CurrentLine,
        Category::Highlight,
        Category::Default,
    ];

    /// Categories replaced wholesale by every highlight pass
    pub const PASS: [Category; 10] = [
        Category::Keyword,
        Category::Builtin,
        Category::String,
        Category::Docstring,
        Category::Comment,
        Category::Number,
        Category::Function,
        Category::Class,
        Category::Decorator,
        Category::Operator,
    ];

    /// Tag name as exposed to the host buffer
    pub fn name(&self) -> &'static str {
        match self {
            Category::Keyword => "keyword",
            Category::Builtin => "builtin",
            Category::String => "string",
            Category::Docstring => "docstring",
            Category::Comment => "comment",
            Category::Number => "number",
            Category::Function => "function",
            Category::Class => "class",
            Category::Decorator => "decorator",
            Category::Operator => "operator",
            Category::Error => "error",
            Category::CurrentLine => "current_line",
            Category::Highlight => "highlight",
            Category::Default => "default",
        }
    }

    /// Parse a category from its tag name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(1, 9) < Position::new(2, 0));
        assert!(Position::new(3, 2) < Position::new(3, 4));
        assert_eq!(Position::new(2, 5).to_string(), "2.5");
    }

    #[test]
    fn test_region_overlaps() {
        let a = Region::new(Position::new(1, 0), Position::new(1, 5));
        let b = Region::new(Position::new(1, 5), Position::new(1, 8));
        let c = Region::new(Position::new(1, 4), Position::new(2, 0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert!(a.contains(Position::new(1, 4)));
        assert!(!a.contains(Position::new(1, 5)));
    }

    #[test]
    fn test_from_name_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_name(category.name()), Some(category));
        }
        assert_eq!(Category::from_name("Keyword"), None);
        assert_eq!(Category::from_name(""), None);
    }

    #[test]
    fn test_pass_categories() {
        for owned_elsewhere in [
            Category::Highlight,
            Category::CurrentLine,
            Category::Error,
            Category::Default,
        ] {
            assert!(!Category::PASS.contains(&owned_elsewhere));
        }
        assert_eq!(Category::PASS.len() + 4, Category::COUNT);
    }
}
