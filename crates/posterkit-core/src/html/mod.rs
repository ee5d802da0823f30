//! HTML import and export.

mod export;
mod import;
mod measure;
mod sanitize;

pub use export::{EXPORT_FILENAME, EXPORT_MIME_TYPE, ExportedFile, export_html};
pub use import::import_elements;
pub use measure::{Measure, MeasuredNode, NodeKind, StaticLayout};
pub use sanitize::{
    ALLOWED_ATTRIBUTES, ALLOWED_TAGS, ElementNode, Fragment, Node, RAW_CONTENT_TAGS, is_safe_style,
    is_safe_uri, sanitize_html,
};
