//! Line representation addressed by char columns

/// A single line of text in a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    /// The text content (without trailing newline)
    text: String,
}

impl Line {
    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Byte offset of a char column, clamped to the line end
    pub fn col_to_byte(&self, col: usize) -> usize {
        self.text
            .char_indices()
            .nth(col)
            .map_or(self.text.len(), |(byte, _)| byte)
    }

    /// Text between two char columns, clamped to the line
    pub fn slice_cols(&self, start: usize, end: usize) -> &str {
        let start = self.col_to_byte(start);
        let end = self.col_to_byte(end);
        if start >= end {
            return "";
        }
        &self.text[start..end]
    }

    /// Text from a char column to the end of the line
    pub fn slice_from(&self, col: usize) -> &str {
        &self.text[self.col_to_byte(col)..]
    }

    /// Split the line at a char column, returning the remainder
    pub fn split_off(&mut self, col: usize) -> Line {
        let byte = self.col_to_byte(col);
        Line::from(self.text.split_off(byte))
    }

    /// Truncate the line at a char column
    pub fn truncate(&mut self, col: usize) {
        let byte = self.col_to_byte(col);
        self.text.truncate(byte);
    }

    /// Append a string to this line
    pub fn append_str(&mut self, s: &str) {
        self.text.push_str(s);
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self {
            text: s.to_string(),
        }
    }
}

impl From<String> for Line {
    fn from(text: String) -> Self {
        Self { text }
    }
}
