//! PosterKit Core Library
//!
//! Platform-agnostic editing engine for fixed-size HTML posters: the element
//! model, selection, undo history, snapping, viewport, HTML import/export and
//! project persistence.

pub mod config;
pub mod document;
pub mod drag;
pub mod editor;
pub mod element;
pub mod events;
pub mod history;
pub mod html;
pub mod input;
pub mod selection;
pub mod shortcuts;
pub mod snap;
pub mod storage;
pub mod viewport;

pub use config::{ConfigError, EditorConfig};
pub use document::{Document, EditorState};
pub use drag::{DragSession, DragStep};
pub use editor::{Confirm, DELETE_PROMPT, Editor, sample_document};
pub use element::{
    Color, Element, ElementId, ElementPatch, ElementStyle, FontWeight, ImageElement,
    ImageProperty, TextElement,
};
pub use events::{EditorEvent, EventBus, EventHandler};
pub use history::History;
pub use html::{ExportedFile, Measure, MeasuredNode, StaticLayout, export_html, import_elements, sanitize_html};
pub use input::{Modifiers, PointerEvent};
pub use selection::Selection;
pub use shortcuts::{KeyChord, ShortcutAction, ShortcutRegistry};
pub use snap::{Guides, SnapResult, snap_position, snap_to_grid};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use viewport::{PanGesture, Viewport};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
