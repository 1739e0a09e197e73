//! Token classification
//!
//! Maps tokens to semantic categories. Names are looked up in static
//! keyword and builtin sets; `@` operators look ahead on their line for a
//! decorator name; names following `def` or `class` are definitions.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{LexError, Result};
use super::builtins::{BUILTINS, KEYWORDS};
use super::store::StyledRange;
use super::tokens::{Category, Position, Region, Token, TokenKind};

/// What the classifier may look at besides the token itself
#[derive(Debug, Clone, Copy, Default)]
pub struct Context<'a> {
    /// Full text of the line the token starts on
    pub line: &'a str,
    /// The token lexed just before this one
    pub previous: Option<&'a Token>,
}

/// Output of classifying a token stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    /// Non-overlapping ranges in position order
    pub ranges: Vec<StyledRange>,
    /// String literals spanning more than one line
    pub multiline_strings: Vec<Region>,
    /// Number of tokens consumed
    pub token_count: usize,
}

/// Token classifier with precomputed name sets
pub struct Classifier {
    keywords: HashSet<&'static str>,
    builtins: HashSet<&'static str>,
    decorator: Regex,
}

impl Classifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            keywords: KEYWORDS.iter().copied().collect(),
            builtins: BUILTINS.iter().copied().collect(),
            decorator: Regex::new(r"^@\w+")?,
        })
    }

    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords.contains(name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtins.contains(name) || is_dunder(name)
    }

    /// Classify a single token
    pub fn classify(&self, token: &Token, context: &Context<'_>) -> Category {
        match token.kind {
            TokenKind::Name => self.classify_name(&token.text, context.previous),
            TokenKind::String => classify_string(token),
            TokenKind::Number => Category::Number,
            TokenKind::Comment => Category::Comment,
            TokenKind::Operator => {
                if self.decorator_span(token, context.line).is_some() {
                    Category::Decorator
                } else {
                    Category::Operator
                }
            }
            TokenKind::Other => Category::Default,
        }
    }

    fn classify_name(&self, name: &str, previous: Option<&Token>) -> Category {
        if self.is_keyword(name) {
            return Category::Keyword;
        }
        let defined_by = previous
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| t.text.as_str());
        match defined_by {
            Some("def") => Category::Function,
            Some("class") => Category::Class,
            _ if self.is_builtin(name) => Category::Builtin,
            _ => Category::Default,
        }
    }

    /// Span of `@name` when `token` is an `@` directly followed by a word
    pub fn decorator_span(&self, token: &Token, line: &str) -> Option<Region> {
        if token.kind != TokenKind::Operator || token.text != "@" {
            return None;
        }
        let (offset, _) = line.char_indices().nth(token.start.col)?;
        let rest = &line[offset..];
        let m = self.decorator.find(rest)?;
        let width = rest[..m.end()].chars().count();
        Some(Region::new(
            token.start,
            Position::new(token.start.line, token.start.col + width),
        ))
    }

    /// Classify a token stream over `text` into styled ranges
    ///
    /// Tokens covered by a decorator span are folded into it. Stops at the
    /// first lex error.
    pub fn styled_ranges<I>(&self, tokens: I, text: &str) -> std::result::Result<Classified, LexError>
    where
        I: IntoIterator<Item = std::result::Result<Token, LexError>>,
    {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut classified = Classified::default();
        let mut previous: Option<Token> = None;
        let mut covered_until: Option<Position> = None;

        for token in tokens {
            let token = token?;
            classified.token_count += 1;

            let mut region = token.region();
            if let Some(end) = covered_until {
                if token.start < end {
                    if token.end <= end {
                        previous = Some(token);
                        continue;
                    }
                    region.start = end;
                }
            }

            let line = lines.get(token.start.line - 1).copied().unwrap_or("");
            if let Some(span) = self.decorator_span(&token, line) {
                covered_until = Some(span.end);
                classified.ranges.push(StyledRange::new(Category::Decorator, span));
            } else {
                let context = Context {
                    line,
                    previous: previous.as_ref(),
                };
                let category = self.classify(&token, &context);
                if token.kind == TokenKind::String && token.is_multiline() {
                    classified.multiline_strings.push(token.region());
                }
                if category != Category::Default {
                    classified.ranges.push(StyledRange::new(category, region));
                }
            }
            previous = Some(token);
        }

        Ok(classified)
    }
}

fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

fn classify_string(token: &Token) -> Category {
    if token.is_multiline() {
        return Category::Docstring;
    }
    let body = token.text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let triple = |s: &str| s.starts_with("\"\"\"") || s.starts_with("'''");
    let triple_end = |s: &str| s.ends_with("\"\"\"") || s.ends_with("'''");
    if triple(body) || triple_end(body) {
        Category::Docstring
    } else {
        Category::String
    }
}
