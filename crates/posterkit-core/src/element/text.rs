//! Text element.

use super::{ElementId, ElementStyle};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A block of text placed on the poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub(crate) id: ElementId,
    /// Left edge in canvas units.
    pub x: f64,
    /// Top edge in canvas units.
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
    pub styles: ElementStyle,
    /// The text content, edited in place.
    pub content: String,
}

impl TextElement {
    /// Create an intrinsically sized text element at `position`.
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: position.x,
            y: position.y,
            width: None,
            height: None,
            styles: ElementStyle::default(),
            content: content.into(),
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_styles(mut self, styles: ElementStyle) -> Self {
        self.styles = styles;
        self
    }

    pub fn id(&self) -> ElementId {
        self.id
    }
}
