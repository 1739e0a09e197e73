//! Configuration file support
//!
//! Loads settings from ~/.tagpad.toml (or %USERPROFILE%\.tagpad.toml on Windows)
//!
//! Example:
//! ```toml
//! # tagpad configuration
//! enabled = true
//! viewport-margin = 2
//!
//! [styles.keyword]
//! fg = "purple"
//! bold = true
//!
//! [styles.highlight]
//! bg = "#ffff66"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{HighlightError, Result};
use crate::syntax::{Category, Color, Style, StyleRegistry};

/// Default number of extra lines highlighted below the viewport
pub const DEFAULT_VIEWPORT_MARGIN: usize = 2;

/// Configuration settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Whether syntax highlighting runs at all
    pub enabled: bool,
    /// Lines padded below the last visible line
    pub viewport_margin: usize,
    /// Style overrides keyed by category name
    pub styles: BTreeMap<String, StyleConfig>,
}

/// Style override for one category; unset fields keep the default
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            viewport_margin: DEFAULT_VIEWPORT_MARGIN,
            styles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".tagpad.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".tagpad.toml"))
        }
    }

    /// Load the user configuration, falling back to defaults
    pub fn load_default() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.style_overrides()?;
        Ok(config)
    }

    /// Resolve style overrides against the default styles
    pub fn style_overrides(&self) -> Result<BTreeMap<Category, Style>> {
        let defaults = StyleRegistry::default();
        let mut overrides = BTreeMap::new();
        for (name, entry) in &self.styles {
            let category = Category::from_name(name)
                .ok_or_else(|| HighlightError::ClassificationPrecondition(name.clone()))?;
            let style = entry.apply(defaults.style_of(category))?;
            overrides.insert(category, style);
        }
        Ok(overrides)
    }

    /// Build the style registry for this configuration
    pub fn registry(&self) -> Result<StyleRegistry> {
        Ok(StyleRegistry::with_overrides(&self.style_overrides()?))
    }
}

impl StyleConfig {
    fn apply(&self, mut style: Style) -> Result<Style> {
        if let Some(fg) = &self.fg {
            style.fg = fg.parse::<Color>()?;
        }
        if let Some(bg) = &self.bg {
            style.bg = match bg.trim() {
                "" | "none" => None,
                bg => Some(bg.parse::<Color>()?),
            };
        }
        if let Some(bold) = self.bold {
            style.bold = bold;
        }
        if let Some(italic) = self.italic {
            style.italic = italic;
        }
        if let Some(underline) = self.underline {
            style.underline = underline;
        }
        Ok(style)
    }
}
