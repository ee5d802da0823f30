//! Presentation attributes carried by elements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a CSS color string cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized color: {0}")]
pub struct ColorParseError(pub String);

/// An RGBA8 color that round-trips through CSS color syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Render as a CSS color: `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let alpha = (self.a as f64 / 255.0 * 1000.0).round() / 1000.0;
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
        }
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Parse the argument list of `rgb(...)` / `rgba(...)`.
    /// Accepts both comma and whitespace separated forms, with an optional `/ alpha`.
    fn parse_functional(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if parts.len() != 3 && parts.len() != 4 {
            return None;
        }
        let channel = |s: &str| -> Option<u8> {
            let value = match s.strip_suffix('%') {
                Some(pct) => pct.parse::<f64>().ok()? * 2.55,
                None => s.parse::<f64>().ok()?,
            };
            Some(value.round().clamp(0.0, 255.0) as u8)
        };
        let alpha = match parts.get(3) {
            Some(s) => {
                let value = match s.strip_suffix('%') {
                    Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                    None => s.parse::<f64>().ok()?,
                };
                (value.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };
        Some(Self::new(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Self::black(),
            "white" => Self::white(),
            "transparent" => Self::transparent(),
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            _ => return None,
        };
        Some(color)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
            Self::parse_hex(hex)
        } else if let Some(args) = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))
        {
            args.strip_suffix(')').and_then(Self::parse_functional)
        } else {
            Self::named(&trimmed)
        };
        parsed.ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_css()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Numeric CSS font weight (100-900).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "FontWeightRepr", into = "u16")]
pub struct FontWeight(u16);

/// Stored projects may carry the weight as a number or as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum FontWeightRepr {
    Number(u16),
    Text(String),
}

impl FontWeight {
    pub const LIGHT: FontWeight = FontWeight(300);
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const SEMIBOLD: FontWeight = FontWeight(600);
    pub const BOLD: FontWeight = FontWeight(700);

    /// Create a weight, rejecting values outside 1..=1000.
    pub fn new(value: u16) -> Option<Self> {
        (1..=1000).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Display name for the weights the property panel offers.
    pub fn display_name(self) -> &'static str {
        match self.0 {
            0..=349 => "Light",
            350..=499 => "Normal",
            500..=649 => "Semibold",
            _ => "Bold",
        }
    }

    /// Weights offered by the property panel.
    pub fn all() -> &'static [FontWeight] {
        &[FontWeight::NORMAL, FontWeight::SEMIBOLD, FontWeight::BOLD]
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl FromStr for FontWeight {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "normal" => return Ok(Self::NORMAL),
            "bold" => return Ok(Self::BOLD),
            _ => {}
        }
        s.parse::<u16>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("Invalid font weight: {}", s))
    }
}

impl TryFrom<FontWeightRepr> for FontWeight {
    type Error = String;

    fn try_from(repr: FontWeightRepr) -> Result<Self, Self::Error> {
        match repr {
            FontWeightRepr::Number(n) => {
                Self::new(n).ok_or_else(|| format!("Invalid font weight: {}", n))
            }
            FontWeightRepr::Text(s) => s.parse(),
        }
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
    Justify,
}

impl TextAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
            TextAlign::Justify => "justify",
        }
    }
}

/// Presentation attributes of an element.
///
/// A closed set of keys; anything not listed here is not carried by the model.
/// Serialized with the camelCase names used by the persisted project format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl ElementStyle {
    /// Check whether no attribute is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay `other` on top of `self`: attributes set in `other` win.
    pub fn merged(&self, other: &ElementStyle) -> Self {
        Self {
            font_size: other.font_size.or(self.font_size),
            font_weight: other.font_weight.or(self.font_weight),
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            color: other.color.or(self.color),
            background_color: other.background_color.or(self.background_color),
            text_align: other.text_align.or(self.text_align),
            border_radius: other.border_radius.or(self.border_radius),
            opacity: other.opacity.or(self.opacity),
        }
    }

    /// CSS declarations in a stable order.
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        let mut decls = Vec::new();
        if let Some(size) = self.font_size {
            decls.push(("font-size", px(size)));
        }
        if let Some(weight) = self.font_weight {
            decls.push(("font-weight", weight.value().to_string()));
        }
        if let Some(family) = &self.font_family {
            decls.push(("font-family", family.clone()));
        }
        if let Some(color) = self.color {
            decls.push(("color", color.to_css()));
        }
        if let Some(color) = self.background_color {
            decls.push(("background-color", color.to_css()));
        }
        if let Some(align) = self.text_align {
            decls.push(("text-align", align.as_css().to_string()));
        }
        if let Some(radius) = self.border_radius {
            decls.push(("border-radius", px(radius)));
        }
        if let Some(opacity) = self.opacity {
            decls.push(("opacity", opacity.clamp(0.0, 1.0).to_string()));
        }
        decls
    }
}

/// Format a length in CSS pixels.
pub fn px(value: f64) -> String {
    format!("{}px", value)
}
