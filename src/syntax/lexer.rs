//! Python tokenizer
//!
//! Converts source text into a lazy sequence of tokens. The tokenizer is
//! restartable on arbitrary slices and stops at the first malformed
//! construct, yielding a single `LexError` and then ending.
//!
//! Whitespace, newlines and line continuations produce no tokens.

use std::iter::FusedIterator;

use crate::error::LexError;
use super::tokens::{Position, Token, TokenKind};

const TAB_SIZE: usize = 8;

/// Operators and delimiters, longest first
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...",
    "!=", "%=", "&=", "**", "*=", "+=", "-=", "->", "//", "/=", ":=",
    "<<", "<=", "==", ">=", ">>", "@=", "^=", "|=",
    "%", "&", "(", ")", "*", "+", ",", "-", ".", "/", ":", ";",
    "<", "=", ">", "@", "[", "]", "^", "{", "|", "}", "~",
];

/// Tokenizer options
#[derive(Debug, Clone, Copy, Default)]
pub struct LexOptions {
    /// Reject dedents to a level that was never opened.
    ///
    /// Only meaningful when the text starts at column 0 of a file; a slice
    /// from the middle of a file has no indentation baseline.
    pub check_indentation: bool,
    /// The text stops before the end of the file.
    ///
    /// Open brackets and a trailing line continuation at end of input are
    /// then a normal end rather than `EofInStatement`.
    pub partial_end: bool,
}

/// Tokenize `text` with default options
pub fn tokenize(text: &str) -> Tokens<'_> {
    tokenize_with(text, LexOptions::default())
}

/// Tokenize `text` with explicit options
pub fn tokenize_with(text: &str, options: LexOptions) -> Tokens<'_> {
    Tokens {
        cursor: Cursor::new(text),
        options,
        indents: vec![0],
        depth: 0,
        at_line_start: true,
        done: false,
    }
}

/// Character cursor tracking byte offset and buffer position
struct Cursor<'a> {
    src: &'a str,
    offset: usize,
    line: usize,
    col: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            line: 1,
            col: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.col)
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }
}

/// Lazy token stream over a text slice
pub struct Tokens<'a> {
    cursor: Cursor<'a>,
    options: LexOptions,
    /// Open indentation levels, innermost last
    indents: Vec<usize>,
    /// Bracket nesting depth; newlines inside brackets do not end a line
    depth: usize,
    at_line_start: bool,
    done: bool,
}

impl<'a> Tokens<'a> {
    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        loop {
            if self.at_line_start {
                self.at_line_start = false;
                if let Err(err) = self.check_indentation() {
                    return Some(Err(err));
                }
            }

            let start = self.cursor.pos();
            let offset = self.cursor.offset;
            let ch = match self.cursor.peek() {
                Some(ch) => ch,
                None if self.depth > 0 && !self.options.partial_end => {
                    return Some(Err(LexError::EofInStatement { line: start.line }))
                }
                None => return None,
            };

            match ch {
                '\n' => {
                    self.cursor.bump();
                    self.at_line_start = self.depth == 0;
                }
                ' ' | '\t' | '\x0c' | '\r' => {
                    self.cursor.bump();
                }
                '\\' => {
                    self.cursor.bump();
                    match self.cursor.peek() {
                        Some('\n') => {
                            self.cursor.bump();
                        }
                        Some('\r') if self.cursor.peek_nth(1) == Some('\n') => {
                            self.cursor.bump();
                            self.cursor.bump();
                        }
                        None if self.options.partial_end => return None,
                        None => return Some(Err(LexError::EofInStatement { line: start.line })),
                        Some(_) => return Some(Ok(self.finish(TokenKind::Other, offset, start))),
                    }
                }
                '#' => {
                    self.cursor.bump_while(|c| c != '\n');
                    return Some(Ok(self.finish(TokenKind::Comment, offset, start)));
                }
                '"' | '\'' => return Some(self.string(offset, start)),
                c if c.is_ascii_digit() => return Some(Ok(self.number(offset, start))),
                '.' if self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    return Some(Ok(self.number(offset, start)));
                }
                c if is_ident_start(c) => return Some(self.name_or_string(offset, start)),
                _ => return Some(Ok(self.operator(offset, start))),
            }
        }
    }

    /// Validate the indentation of a new logical line
    fn check_indentation(&mut self) -> Result<(), LexError> {
        if !self.options.check_indentation {
            return Ok(());
        }

        let mut width = 0;
        let mut first = None;
        for ch in self.cursor.rest().chars() {
            match ch {
                ' ' => width += 1,
                '\t' => width = (width / TAB_SIZE + 1) * TAB_SIZE,
                '\x0c' => width = 0,
                _ => {
                    first = Some(ch);
                    break;
                }
            }
        }

        // Blank and comment-only lines do not take part in indentation
        if matches!(first, None | Some('\n' | '\r' | '#')) {
            return Ok(());
        }

        let top = self.indents.last().copied().unwrap_or(0);
        if width > top {
            self.indents.push(width);
            return Ok(());
        }
        while self.indents.last().is_some_and(|&level| width < level) {
            self.indents.pop();
        }
        if self.indents.last().copied().unwrap_or(0) != width {
            return Err(LexError::Indentation {
                line: self.cursor.line,
            });
        }
        Ok(())
    }

    fn name_or_string(&mut self, offset: usize, start: Position) -> Result<Token, LexError> {
        self.cursor.bump_while(is_ident_continue);
        let ident = &self.cursor.src[offset..self.cursor.offset];
        if matches!(self.cursor.peek(), Some('"' | '\'')) && is_string_prefix(ident) {
            return self.string(offset, start);
        }
        Ok(self.finish(TokenKind::Name, offset, start))
    }

    /// Lex a string literal; the cursor sits on the opening quote
    fn string(&mut self, offset: usize, start: Position) -> Result<Token, LexError> {
        let Some(quote) = self.cursor.bump() else {
            return Err(LexError::UnterminatedString {
                line: start.line,
                col: start.col,
            });
        };
        let triple = self.cursor.peek() == Some(quote) && self.cursor.peek_nth(1) == Some(quote);
        if triple {
            self.cursor.bump();
            self.cursor.bump();
        }

        let unterminated = if triple {
            LexError::EofInString {
                line: start.line,
                col: start.col,
            }
        } else {
            LexError::UnterminatedString {
                line: start.line,
                col: start.col,
            }
        };

        loop {
            match self.cursor.bump() {
                None => return Err(unterminated),
                Some('\\') => {
                    // The escaped character may be a newline
                    self.cursor.bump();
                }
                Some('\n') if !triple => return Err(unterminated),
                Some(c) if c == quote => {
                    if !triple {
                        break;
                    }
                    if self.cursor.peek() == Some(quote) && self.cursor.peek_nth(1) == Some(quote) {
                        self.cursor.bump();
                        self.cursor.bump();
                        break;
                    }
                }
                Some(_) => {}
            }
        }

        Ok(self.finish(TokenKind::String, offset, start))
    }

    fn number(&mut self, offset: usize, start: Position) -> Token {
        let radix_prefix = self.cursor.peek() == Some('0')
            && matches!(self.cursor.peek_nth(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B'));

        if radix_prefix {
            self.cursor.bump();
            self.cursor.bump();
            self.cursor.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
            return self.finish(TokenKind::Number, offset, start);
        }

        let digits = |c: char| c.is_ascii_digit() || c == '_';
        self.cursor.bump_while(digits);
        if self.cursor.peek() == Some('.') {
            self.cursor.bump();
            self.cursor.bump_while(digits);
        }
        if matches!(self.cursor.peek(), Some('e' | 'E')) {
            let signed = matches!(self.cursor.peek_nth(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.cursor.peek_nth(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                self.cursor.bump();
                if signed {
                    self.cursor.bump();
                }
                self.cursor.bump_while(digits);
            }
        }
        if matches!(self.cursor.peek(), Some('j' | 'J')) {
            self.cursor.bump();
        }

        self.finish(TokenKind::Number, offset, start)
    }

    fn operator(&mut self, offset: usize, start: Position) -> Token {
        let rest = self.cursor.rest();
        let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
            self.cursor.bump();
            return self.finish(TokenKind::Other, offset, start);
        };

        // Operators are ASCII, so byte length equals char count
        for _ in 0..op.len() {
            self.cursor.bump();
        }
        match *op {
            "(" | "[" | "{" => self.depth += 1,
            ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.finish(TokenKind::Operator, offset, start)
    }

    fn finish(&self, kind: TokenKind, offset: usize, start: Position) -> Token {
        Token {
            kind,
            text: self.cursor.src[offset..self.cursor.offset].to_string(),
            start,
            end: self.cursor.pos(),
        }
    }
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_token();
        if !matches!(item, Some(Ok(_))) {
            self.done = true;
        }
        item
    }
}

impl FusedIterator for Tokens<'_> {}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn is_string_prefix(ident: &str) -> bool {
    matches!(
        ident.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "br" | "rb" | "fr" | "rf"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(text: &str) -> Vec<Token> {
        tokenize(text).collect::<Result<Vec<_>, _>>().unwrap()
    }

    fn kinds(text: &str) -> Vec<(TokenKind, String)> {
        lex(text).into_iter().map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_simple_statement() {
        let tokens = kinds("x = len(y)  # count");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Name, "x".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Name, "len".to_string()),
                (TokenKind::Operator, "(".to_string()),
                (TokenKind::Name, "y".to_string()),
                (TokenKind::Operator, ")".to_string()),
                (TokenKind::Comment, "# count".to_string()),
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = lex("def f():\n    return 1\n");
        let ret = &tokens[5];
        assert_eq!(ret.text, "return");
        assert_eq!(ret.start, Position::new(2, 4));
        assert_eq!(ret.end, Position::new(2, 10));
        let one = &tokens[6];
        assert_eq!(one.start, Position::new(2, 11));
        assert_eq!(one.end, Position::new(2, 12));
    }

    #[test]
    fn test_positions_count_chars_not_bytes() {
        let tokens = lex("s = 'héllo' + x");
        assert_eq!(tokens[2].end, Position::new(1, 11));
        assert_eq!(tokens[4].start, Position::new(1, 14));
    }

    #[test]
    fn test_tokens_strictly_increasing() {
        let tokens = lex("class A(B):\n    @property\n    def x(self): return [1, 2.5e-3, 0xff]\n");
        for pair in tokens.windows(2) {
            assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
            assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn test_string_forms() {
        let tokens = kinds(r#"a = "x\"y" + 'z' + rb'\x00' + f"{v}""#);
        let strings: Vec<_> = tokens
            .into_iter()
            .filter(|(k, _)| *k == TokenKind::String)
            .map(|(_, t)| t)
            .collect();
        assert_eq!(strings, vec![r#""x\"y""#, "'z'", r"rb'\x00'", r#"f"{v}""#]);
    }

    #[test]
    fn test_prefix_like_name_is_name() {
        let tokens = kinds("rb = b");
        assert_eq!(tokens[0], (TokenKind::Name, "rb".to_string()));
        assert_eq!(tokens[2], (TokenKind::Name, "b".to_string()));
    }

    #[test]
    fn test_triple_quoted_multiline() {
        let tokens = lex("x = \"\"\"first\nsecond\"\"\"\ny = 1");
        let doc = &tokens[2];
        assert_eq!(doc.kind, TokenKind::String);
        assert_eq!(doc.start, Position::new(1, 4));
        assert_eq!(doc.end, Position::new(2, 9));
        assert!(doc.is_multiline());
        assert_eq!(tokens[3].start, Position::new(3, 0));
    }

    #[test]
    fn test_numbers() {
        let tokens = kinds("1 1_000 3.14 .5 1e10 2.5E-3 0x1F 0o17 0b1010 3j 1.");
        assert!(tokens.iter().all(|(k, _)| *k == TokenKind::Number));
        let texts: Vec<_> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(
            texts,
            vec!["1", "1_000", "3.14", ".5", "1e10", "2.5E-3", "0x1F", "0o17", "0b1010", "3j", "1."]
        );
    }

    #[test]
    fn test_operators_longest_match() {
        let tokens = kinds("a **= b // c -> d := e ... @f");
        let ops: Vec<_> = tokens
            .iter()
            .filter(|(k, _)| *k == TokenKind::Operator)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(ops, vec!["**=", "//", "->", ":=", "...", "@"]);
    }

    #[test]
    fn test_unknown_characters_are_other() {
        let tokens = kinds("a $ b ? !");
        assert_eq!(tokens[1], (TokenKind::Other, "$".to_string()));
        assert_eq!(tokens[3], (TokenKind::Other, "?".to_string()));
        assert_eq!(tokens[4], (TokenKind::Other, "!".to_string()));
    }

    #[test]
    fn test_line_continuation() {
        let tokens = lex("x = 1 + \\\n    2");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[4].start, Position::new(2, 4));
    }

    #[test]
    fn test_unterminated_string() {
        let mut tokens = tokenize("print('hello)\nx = 1");
        assert_eq!(tokens.next().unwrap().unwrap().text, "print");
        assert_eq!(tokens.next().unwrap().unwrap().text, "(");
        assert_eq!(
            tokens.next(),
            Some(Err(LexError::UnterminatedString { line: 1, col: 6 }))
        );
        // Fused after the error
        assert_eq!(tokens.next(), None);
        assert_eq!(tokens.next(), None);
    }

    #[test]
    fn test_unterminated_triple_string() {
        let result: Result<Vec<_>, _> = tokenize("x = '''never\nclosed").collect();
        assert_eq!(result, Err(LexError::EofInString { line: 1, col: 4 }));
    }

    #[test]
    fn test_eof_in_statement() {
        let result: Result<Vec<_>, _> = tokenize("foo(1,\n  2").collect();
        assert_eq!(result, Err(LexError::EofInStatement { line: 2 }));

        let result: Result<Vec<_>, _> = tokenize("x = 1 + \\").collect();
        assert_eq!(result, Err(LexError::EofInStatement { line: 1 }));
    }

    #[test]
    fn test_partial_end_accepts_open_statement() {
        let partial = LexOptions {
            partial_end: true,
            ..LexOptions::default()
        };
        let tokens: Result<Vec<_>, _> = tokenize_with("CONFIG = {\n  'a': 1,\n", partial).collect();
        assert_eq!(tokens.unwrap().len(), 7);

        let tokens: Result<Vec<_>, _> = tokenize_with("x = 1 + \\", partial).collect();
        assert_eq!(tokens.unwrap().len(), 4);

        // Strings still have to close inside the text
        let result: Result<Vec<_>, _> = tokenize_with("s = '''open\n", partial).collect();
        assert_eq!(result, Err(LexError::EofInString { line: 1, col: 4 }));
    }

    #[test]
    fn test_newline_inside_brackets_skips_indentation() {
        let options = LexOptions {
            check_indentation: true,
            ..LexOptions::default()
        };
        let result: Result<Vec<_>, _> = tokenize_with("x = [\n  1,\n    2,\n]\n", options).collect();
        assert!(result.is_ok());
    }

    #[test]
    fn test_bad_dedent() {
        let source = "if x:\n        a = 1\n    b = 2\n";
        let strict = LexOptions {
            check_indentation: true,
            ..LexOptions::default()
        };
        let result: Result<Vec<_>, _> = tokenize_with(source, strict).collect();
        assert_eq!(result, Err(LexError::Indentation { line: 3 }));

        // Slices without a baseline are not checked
        assert!(tokenize(source).all(|t| t.is_ok()));
    }

    #[test]
    fn test_valid_dedent_and_comment_lines() {
        let source = "def f():\n    if x:\n        a = 1\n  # stray comment\n\n    return a\nb = 2\n";
        let strict = LexOptions {
            check_indentation: true,
            ..LexOptions::default()
        };
        assert!(tokenize_with(source, strict).all(|t| t.is_ok()));
    }

    #[test]
    fn test_restartable() {
        let text = "a = 1";
        let first: Vec<_> = tokenize(text).collect();
        let second: Vec<_> = tokenize(text).collect();
        assert_eq!(first, second);
        assert!(tokenize("").next().is_none());
    }
}
