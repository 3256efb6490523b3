//! Named-color palette
//!
//! Color values in properties resolve through two tiers: a name table (`red`, `lightGray`, ...)
//! and then hex parsing (`#rrggbb` or `#rrggbbaa`, the `#` optional). The name table starts
//! from the UIKit system colors and can be extended or overridden from a TOML file.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a palette file
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse palette TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid color '{value}' for '{name}'")]
    InvalidColor { name: String, value: String },
}

/// An sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const CLEAR: Color = Color::rgba(0, 0, 0, 0);

    /// Parse `rrggbb` or `rrggbbaa`, with or without a leading `#`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// UIKit system colors
const SYSTEM_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0, 0, 0)),
    ("blue", Color::rgb(0, 0, 255)),
    ("brown", Color::rgb(153, 102, 51)),
    ("clear", Color::CLEAR),
    ("cyan", Color::rgb(0, 255, 255)),
    ("darkGray", Color::rgb(85, 85, 85)),
    ("gray", Color::rgb(128, 128, 128)),
    ("green", Color::rgb(0, 255, 0)),
    ("lightGray", Color::rgb(170, 170, 170)),
    ("magenta", Color::rgb(255, 0, 255)),
    ("orange", Color::rgb(255, 128, 0)),
    ("purple", Color::rgb(128, 0, 128)),
    ("red", Color::rgb(255, 0, 0)),
    ("white", Color::rgb(255, 255, 255)),
    ("yellow", Color::rgb(255, 255, 0)),
];

/// Named colors available to property values
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    /// Optional name for the palette
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Color table: name -> color
    pub colors: IndexMap<String, Color>,
}

/// TOML structure for deserializing palettes
#[derive(Deserialize)]
struct TomlPalette {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: IndexMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            colors: SYSTEM_COLORS
                .iter()
                .map(|(name, color)| (name.to_string(), *color))
                .collect(),
        }
    }
}

impl Palette {
    /// Load a palette from a TOML file, layered over the system colors
    pub fn from_file(path: &Path) -> Result<Self, PaletteError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a palette from a TOML string, layered over the system colors
    pub fn from_str(content: &str) -> Result<Self, PaletteError> {
        let parsed: TomlPalette = toml::from_str(content)?;
        let mut palette = Self::default().with_colors(&parsed.colors)?;
        palette.name = parsed.metadata.as_ref().and_then(|m| m.name.clone());
        palette.description = parsed.metadata.as_ref().and_then(|m| m.description.clone());
        Ok(palette)
    }

    /// Add or override named colors given as hex strings
    pub fn with_colors(mut self, colors: &IndexMap<String, String>) -> Result<Self, PaletteError> {
        for (name, value) in colors {
            let color = Color::from_hex(value).ok_or_else(|| PaletteError::InvalidColor {
                name: name.clone(),
                value: value.clone(),
            })?;
            self.colors.insert(name.clone(), color);
        }
        Ok(self)
    }

    pub fn named(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    /// Name table first, then hex
    pub fn resolve(&self, value: &str) -> Option<Color> {
        self.named(value.trim()).or_else(|| Color::from_hex(value))
    }

    /// First name registered for `color`
    pub fn name_of(&self, color: Color) -> Option<&str> {
        self.colors
            .iter()
            .find(|(_, c)| **c == color)
            .map(|(name, _)| name.as_str())
    }

    /// String form that resolves back to the same color
    pub fn describe(&self, color: Color) -> String {
        self.name_of(color)
            .map(str::to_string)
            .unwrap_or_else(|| color.to_hex())
    }
}
