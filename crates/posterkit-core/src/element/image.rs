//! Image element and helpers for turning local image files into sources.

use super::{ElementId, ElementStyle};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Image format of a local image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        if data.starts_with(b"GIF8") {
            return Some(ImageFormat::Gif);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// Encode image bytes as a `data:` URI usable as an image `src`.
/// Returns `None` when the bytes are not a recognized image.
pub fn image_data_uri(data: &[u8]) -> Option<String> {
    let format = ImageFormat::from_magic_bytes(data)?;
    Some(format!(
        "data:{};base64,{}",
        format.mime_type(),
        STANDARD.encode(data)
    ))
}

/// An image placed on the poster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub(crate) id: ElementId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
    pub styles: ElementStyle,
    /// URI, `data:` URI or blob reference.
    pub src: String,
    /// Accessibility text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl ImageElement {
    /// Create an intrinsically sized image at `position`.
    pub fn new(position: Point, src: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: position.x,
            y: position.y,
            width: None,
            height: None,
            styles: ElementStyle::default(),
            src: src.into(),
            alt: None,
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
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
