//! Style types and the category style registry
//!
//! Every category maps to exactly one `Style`. The registry is built once
//! per highlighter and is read-only afterwards.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{HighlightError, Result};
use super::tokens::Category;

/// Terminal colors (ANSI 16-color palette plus 24-bit RGB)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Rgb(u8, u8, u8),
}

impl FromStr for Color {
    type Err = HighlightError;

    /// Accepts palette names (`blue`, `bright-red`, `purple`) and `#rrggbb`
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase().replace(['_', ' '], "-");
        let color = match name.as_str() {
            "default" => Color::Default,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" | "purple" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "gray" | "grey" | "bright-black" => Color::BrightBlack,
            "bright-red" => Color::BrightRed,
            "bright-green" => Color::BrightGreen,
            "bright-yellow" => Color::BrightYellow,
            "bright-blue" => Color::BrightBlue,
            "bright-magenta" => Color::BrightMagenta,
            "bright-cyan" => Color::BrightCyan,
            "bright-white" => Color::BrightWhite,
            "orange" => Color::Rgb(0xff, 0xa5, 0x00),
            hex if hex.starts_with('#') => parse_hex(hex)
                .ok_or_else(|| HighlightError::InvalidColor(s.to_string()))?,
            _ => return Err(HighlightError::InvalidColor(s.to_string())),
        };
        Ok(color)
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// Text style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color, `None` inherits the host background
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Style {
    /// Create a style with just foreground color
    pub fn fg(color: Color) -> Self {
        Self {
            fg: color,
            ..Default::default()
        }
    }

    /// Create a style with just background color
    pub fn bg(color: Color) -> Self {
        Self {
            bg: Some(color),
            ..Default::default()
        }
    }

    /// Builder: set bold
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Builder: set italic
    pub fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Builder: set underline
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Check if this is the default (no styling)
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Default style for a category
fn default_style(category: Category) -> Style {
    match category {
        Category::Keyword => Style::fg(Color::Blue).with_bold(),
        Category::Builtin => Style::fg(Color::Rgb(0xff, 0xa5, 0x00)),
        Category::String => Style::fg(Color::Green),
        Category::Docstring => Style::fg(Color::Green).with_italic(),
        Category::Comment => Style::fg(Color::Red).with_italic(),
        Category::Number => Style::fg(Color::Magenta),
        Category::Function => Style::fg(Color::Cyan),
        Category::Class => Style::fg(Color::Cyan).with_bold(),
        Category::Decorator => Style::fg(Color::BrightMagenta),
        Category::Operator => Style::fg(Color::BrightBlack),
        Category::Error => Style::bg(Color::Red).with_underline(),
        Category::CurrentLine => Style::bg(Color::Rgb(0xe8, 0xf2, 0xfe)),
        Category::Highlight => Style::bg(Color::Yellow),
        Category::Default => Style::default(),
    }
}

/// Fixed mapping from category to style
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: [Style; Category::COUNT],
}

impl StyleRegistry {
    /// Build the registry, replacing defaults with the given overrides
    pub fn with_overrides(overrides: &BTreeMap<Category, Style>) -> Self {
        let mut registry = Self::default();
        for (&category, &style) in overrides {
            registry.styles[category as usize] = style;
        }
        registry
    }

    /// Style for a category
    pub fn style_of(&self, category: Category) -> Style {
        self.styles[category as usize]
    }

    /// Style for a category tag name
    pub fn style_for_name(&self, name: &str) -> Result<Style> {
        Category::from_name(name)
            .map(|category| self.style_of(category))
            .ok_or_else(|| HighlightError::ClassificationPrecondition(name.to_string()))
    }

    /// Iterate `(category, style)` pairs in category order
    pub fn iter(&self) -> impl Iterator<Item = (Category, Style)> + '_ {
        Category::ALL.iter().map(move |&c| (c, self.style_of(c)))
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self {
            styles: Category::ALL.map(default_style),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_builders() {
        let style = Style::fg(Color::Red).with_bold();
        assert_eq!(style.fg, Color::Red);
        assert_eq!(style.bg, None);
        assert!(style.bold);
        assert!(!style.is_default());
        assert!(Style::default().is_default());
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!("blue".parse::<Color>().unwrap(), Color::Blue);
        assert_eq!("Purple".parse::<Color>().unwrap(), Color::Magenta);
        assert_eq!("bright_red".parse::<Color>().unwrap(), Color::BrightRed);
        assert_eq!("#10ff0a".parse::<Color>().unwrap(), Color::Rgb(0x10, 0xff, 0x0a));
        assert!("#12345".parse::<Color>().is_err());
        assert!("chartreuse".parse::<Color>().is_err());
    }

    #[test]
    fn test_registry_defaults() {
        let registry = StyleRegistry::default();
        assert_eq!(registry.style_of(Category::String).fg, Color::Green);
        assert_eq!(registry.style_of(Category::Keyword).fg, Color::Blue);
        assert!(registry.style_of(Category::Default).is_default());
        // Every category except default carries some styling
        for (category, style) in registry.iter() {
            assert_eq!(style.is_default(), category == Category::Default, "{category}");
        }
    }

    #[test]
    fn test_registry_by_name() {
        let registry = StyleRegistry::default();
        assert_eq!(registry.style_for_name("comment").unwrap().fg, Color::Red);
        assert!(matches!(
            registry.style_for_name("bogus"),
            Err(HighlightError::ClassificationPrecondition(name)) if name == "bogus"
        ));
    }

    #[test]
    fn test_registry_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Category::Comment, Style::fg(Color::BrightBlack));
        let registry = StyleRegistry::with_overrides(&overrides);
        assert_eq!(registry.style_of(Category::Comment).fg, Color::BrightBlack);
        assert_eq!(registry.style_of(Category::String).fg, Color::Green);
    }
}
