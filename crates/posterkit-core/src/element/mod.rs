//! Element definitions for the poster.
//!
//! Elements are value objects: every change produces a replacement element
//! rather than mutating one that other parts of the editor may still hold.

mod image;
mod style;
mod text;

pub use image::{ImageElement, ImageFormat, image_data_uri};
pub use style::{Color, ColorParseError, ElementStyle, FontWeight, TextAlign, px};
pub use text::TextElement;

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Font size used when the property panel receives unusable input.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Enum wrapper for all element variants.
///
/// Serialized with a `type` discriminator of `"text"` or `"image"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
}

impl Element {
    pub fn id(&self) -> ElementId {
        match self {
            Element::Text(t) => t.id,
            Element::Image(i) => i.id,
        }
    }

    /// Top-left corner in canvas units.
    pub fn position(&self) -> Point {
        match self {
            Element::Text(t) => Point::new(t.x, t.y),
            Element::Image(i) => Point::new(i.x, i.y),
        }
    }

    pub fn width(&self) -> Option<f64> {
        match self {
            Element::Text(t) => t.width,
            Element::Image(i) => i.width,
        }
    }

    pub fn height(&self) -> Option<f64> {
        match self {
            Element::Text(t) => t.height,
            Element::Image(i) => i.height,
        }
    }

    /// Extent used for snapping and clamping; absent dimensions count as zero.
    pub fn extent(&self) -> Size {
        Size::new(
            self.width().unwrap_or(0.0),
            self.height().unwrap_or(0.0),
        )
    }

    /// Bounding box in canvas units.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position(), self.extent())
    }

    pub fn styles(&self) -> &ElementStyle {
        match self {
            Element::Text(t) => &t.styles,
            Element::Image(i) => &i.styles,
        }
    }

    /// Short variant name, matching the serialized discriminator.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Text(_) => "text",
            Element::Image(_) => "image",
        }
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match self {
            Element::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageElement> {
        match self {
            Element::Image(i) => Some(i),
            _ => None,
        }
    }

    /// Return a copy placed with its top-left corner at `position`.
    pub fn moved_to(&self, position: Point) -> Self {
        let mut moved = self.clone();
        match &mut moved {
            Element::Text(t) => {
                t.x = position.x;
                t.y = position.y;
            }
            Element::Image(i) => {
                i.x = position.x;
                i.y = position.y;
            }
        }
        moved
    }

    /// Return a copy carrying a freshly generated id.
    pub fn with_fresh_id(&self) -> Self {
        let mut copy = self.clone();
        let new_id = Uuid::new_v4();
        match &mut copy {
            Element::Text(t) => t.id = new_id,
            Element::Image(i) => i.id = new_id,
        }
        copy
    }

    /// Return a copy with a new id, shifted by `offset`.
    pub fn duplicated(&self, offset: Vec2) -> Self {
        self.with_fresh_id().moved_to(self.position() + offset)
    }

    /// Merge `patch` into a copy of this element.
    ///
    /// Fields the patch leaves unset are preserved; fields that do not apply
    /// to this variant (e.g. `src` on a text element) are ignored.
    pub fn with_patch(&self, patch: &ElementPatch) -> Self {
        let mut next = self.clone();
        match &mut next {
            Element::Text(t) => {
                apply_common(patch, &mut t.x, &mut t.y, &mut t.width, &mut t.height, &mut t.styles);
                if let Some(content) = &patch.content {
                    t.content = content.clone();
                }
            }
            Element::Image(i) => {
                apply_common(patch, &mut i.x, &mut i.y, &mut i.width, &mut i.height, &mut i.styles);
                if let Some(src) = &patch.src {
                    i.src = src.clone();
                }
                if let Some(alt) = &patch.alt {
                    i.alt = alt.clone();
                }
            }
        }
        next
    }
}

fn apply_common(
    patch: &ElementPatch,
    x: &mut f64,
    y: &mut f64,
    width: &mut Option<f64>,
    height: &mut Option<f64>,
    styles: &mut ElementStyle,
) {
    if let Some(new_x) = patch.x {
        *x = new_x;
    }
    if let Some(new_y) = patch.y {
        *y = new_y;
    }
    if let Some(w) = patch.width {
        *width = w;
    }
    if let Some(h) = patch.height {
        *height = h;
    }
    if let Some(s) = &patch.styles {
        *styles = s.clone();
    }
}

impl From<TextElement> for Element {
    fn from(text: TextElement) -> Self {
        Element::Text(text)
    }
}

impl From<ImageElement> for Element {
    fn from(image: ImageElement) -> Self {
        Element::Image(image)
    }
}

/// A partial update to an element.
///
/// `None` leaves a field untouched. For optional fields the inner `Option`
/// is the new value, so `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<Option<f64>>,
    pub height: Option<Option<f64>>,
    /// Replaces the whole style set.
    pub styles: Option<ElementStyle>,
    pub content: Option<String>,
    pub src: Option<String>,
    pub alt: Option<Option<String>>,
}

impl ElementPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn position(position: Point) -> Self {
        Self {
            x: Some(position.x),
            y: Some(position.y),
            ..Default::default()
        }
    }

    pub fn styles(styles: ElementStyle) -> Self {
        Self {
            styles: Some(styles),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Image fields editable from the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageProperty {
    Src,
    Alt,
    Width,
    Height,
}

impl ImageProperty {
    /// Build a patch from raw property-panel input.
    pub fn patch(self, raw: &str) -> ElementPatch {
        match self {
            ImageProperty::Src => ElementPatch {
                src: Some(raw.to_string()),
                ..Default::default()
            },
            ImageProperty::Alt => ElementPatch {
                alt: Some(Some(raw.to_string())),
                ..Default::default()
            },
            ImageProperty::Width => ElementPatch {
                width: Some(parse_dimension(raw)),
                ..Default::default()
            },
            ImageProperty::Height => ElementPatch {
                height: Some(parse_dimension(raw)),
                ..Default::default()
            },
        }
    }
}

/// Parse the leading integer of `raw`, the way number inputs deliver it.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    trimmed[..end].parse().ok()
}

/// Width/height input: empty, non-numeric, zero or negative input means
/// "intrinsic size".
pub fn parse_dimension(raw: &str) -> Option<f64> {
    leading_integer(raw).filter(|v| *v > 0).map(|v| v as f64)
}

/// Font size input: unusable input falls back to [`DEFAULT_FONT_SIZE`].
pub fn parse_font_size(raw: &str) -> f64 {
    leading_integer(raw)
        .filter(|v| *v > 0)
        .map(|v| v as f64)
        .unwrap_or(DEFAULT_FONT_SIZE)
}
