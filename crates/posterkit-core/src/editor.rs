//! The editor: document, selection, history and view in one value, with every
//! user action exposed as a method.

use crate::config::EditorConfig;
use crate::document::{Document, EditorState};
use crate::drag::DragSession;
use crate::element::{
    Color, Element, ElementId, ElementPatch, ElementStyle, FontWeight, ImageElement,
    ImageProperty, TextElement, image_data_uri, parse_font_size,
};
use crate::events::{EditorEvent, EventBus, EventHandler};
use crate::history::History;
use crate::html::{self, ExportedFile, Measure};
use crate::input::{Modifiers, PointerEvent};
use crate::selection::Selection;
use crate::shortcuts::{KeyChord, ShortcutAction};
use crate::snap::Guides;
use crate::storage::{self, Storage, StorageResult};
use crate::viewport::{PanGesture, Viewport};
use kurbo::{Point, Vec2};

/// Question asked before deleting the selection.
pub const DELETE_PROMPT: &str = "Delete selected element(s)?";

const NEW_TEXT_CONTENT: &str = "New Text";
const NEW_TEXT_FONT_SIZE: f64 = 18.0;
const NEW_IMAGE_SRC: &str = "https://placehold.co/160x160/png";
const NEW_IMAGE_SIZE: f64 = 160.0;
const INK: Color = Color::rgb(0x11, 0x11, 0x11);

/// Yes/no confirmation supplied by the host for destructive actions.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// Pointer gesture in progress.
#[derive(Debug, Clone)]
enum Gesture {
    Drag(DragSession),
    Pan(PanGesture),
}

/// Poster editor state and operations.
#[derive(Debug)]
pub struct Editor {
    state: EditorState,
    history: History<EditorState>,
    viewport: Viewport,
    guides: Guides,
    gesture: Option<Gesture>,
    config: EditorConfig,
    events: EventBus,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// An empty editor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let history = match config.history_limit {
            Some(limit) => History::with_limit(limit),
            None => History::new(),
        };
        Self {
            state: EditorState::default(),
            history,
            viewport: Viewport::from_config(&config),
            guides: Guides::default(),
            gesture: None,
            config,
            events: EventBus::new(),
        }
    }

    /// An editor holding the demo poster. The demo is not an undo step.
    pub fn with_sample_document(config: EditorConfig) -> Self {
        let mut editor = Self::with_config(config);
        editor.state = EditorState::new(sample_document());
        editor
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn primary_element(&self) -> Option<&Element> {
        self.state.primary_element()
    }

    pub fn history(&self) -> &History<EditorState> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Alignment guides of the active drag.
    pub fn guides(&self) -> &Guides {
        &self.guides
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Drag(_)))
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Pan(_)))
    }

    /// Register an observer for editor events.
    pub fn subscribe(&mut self, handler: impl EventHandler + 'static) {
        self.events.subscribe(Box::new(handler));
    }

    // --- Document edits -----------------------------------------------

    /// Add a "New Text" element and select it.
    pub fn add_text(&mut self) -> ElementId {
        let styles = ElementStyle {
            font_size: Some(NEW_TEXT_FONT_SIZE),
            color: Some(INK),
            ..Default::default()
        };
        let text = TextElement::new(Point::new(60.0, 60.0), NEW_TEXT_CONTENT).with_styles(styles);
        self.add_element(text.into())
    }

    /// Add a placeholder image and select it.
    pub fn add_image(&mut self) -> ElementId {
        let image = ImageElement::new(Point::new(80.0, 80.0), NEW_IMAGE_SRC)
            .with_size(NEW_IMAGE_SIZE, NEW_IMAGE_SIZE)
            .with_alt("image");
        self.add_element(image.into())
    }

    pub fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id();
        let next = self.state.add_element(element);
        self.commit(next);
        id
    }

    /// Delete every selected element once the host confirms.
    /// Returns false if nothing was selected or the host declined.
    pub fn delete_selected(&mut self, confirm: &mut dyn Confirm) -> bool {
        if self.state.selection.is_empty() {
            return false;
        }
        if !confirm.confirm(DELETE_PROMPT) {
            log::debug!("Delete declined");
            return false;
        }
        let ids = self.state.selection.ids().to_vec();
        let next = self.state.remove_elements(&ids);
        self.commit(next);
        true
    }

    /// Merge `patch` into the primary element as one undo step.
    pub fn update_primary(&mut self, patch: &ElementPatch) -> bool {
        let Some(id) = self.state.selection.primary() else {
            return false;
        };
        match self.state.update_element(id, patch) {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    /// Replace the content of the primary element if it is text.
    pub fn set_text_content(&mut self, content: &str) -> bool {
        if self.primary_element().and_then(Element::as_text).is_none() {
            return false;
        }
        self.update_primary(&ElementPatch::content(content))
    }

    /// Apply raw property-panel input to the primary element if it is an image.
    pub fn set_image_property(&mut self, property: ImageProperty, raw: &str) -> bool {
        if self.primary_element().and_then(Element::as_image).is_none() {
            return false;
        }
        self.update_primary(&property.patch(raw))
    }

    /// Point the primary image at the contents of a local image file.
    /// Returns false for bytes that are not a recognized image.
    pub fn replace_image(&mut self, data: &[u8]) -> bool {
        if self.primary_element().and_then(Element::as_image).is_none() {
            return false;
        }
        let Some(uri) = image_data_uri(data) else {
            log::warn!("Not a recognized image ({} bytes)", data.len());
            return false;
        };
        self.update_primary(&ImageProperty::Src.patch(&uri))
    }

    pub fn set_font_size(&mut self, raw: &str) -> bool {
        self.restyle_primary_text(ElementStyle {
            font_size: Some(parse_font_size(raw)),
            ..Default::default()
        })
    }

    pub fn set_color(&mut self, color: Color) -> bool {
        self.restyle_primary_text(ElementStyle {
            color: Some(color),
            ..Default::default()
        })
    }

    pub fn set_font_weight(&mut self, weight: FontWeight) -> bool {
        self.restyle_primary_text(ElementStyle {
            font_weight: Some(weight),
            ..Default::default()
        })
    }

    /// Overlay `overrides` on the primary text element's styles.
    fn restyle_primary_text(&mut self, overrides: ElementStyle) -> bool {
        let Some(text) = self.primary_element().and_then(Element::as_text) else {
            return false;
        };
        let styles = text.styles.merged(&overrides);
        self.update_primary(&ElementPatch::styles(styles))
    }

    /// Copy the selection, offset by the configured amount, and select the copies.
    pub fn duplicate_selected(&mut self) -> bool {
        let offset = Vec2::new(self.config.duplicate_offset, self.config.duplicate_offset);
        let ids = self.state.selection.ids().to_vec();
        match self
            .state
            .duplicate_elements(&ids, offset, self.config.canvas_size)
        {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    pub fn undo(&mut self) -> bool {
        self.finish_gesture();
        self.step_history(|history, state| history.undo(state))
    }

    pub fn redo(&mut self) -> bool {
        self.finish_gesture();
        self.step_history(|history, state| history.redo(state))
    }

    fn step_history(
        &mut self,
        step: impl FnOnce(&mut History<EditorState>, &mut EditorState) -> bool,
    ) -> bool {
        let before = self.state.clone();
        if !step(&mut self.history, &mut self.state) {
            return false;
        }
        self.notify_state(&before);
        self.notify_history();
        true
    }

    // --- Selection and pointer ----------------------------------------

    /// Click selection: Ctrl/Cmd toggles membership, otherwise `id` becomes
    /// the only selected element.
    pub fn click(&mut self, id: ElementId, modifiers: Modifiers) {
        if !self.state.document.contains(id) {
            return;
        }
        let before = self.state.selection.clone();
        if modifiers.command() {
            self.state.selection.toggle(id);
        } else {
            self.state.selection.replace(id);
        }
        self.notify_selection(&before);
    }

    /// Press on an element.
    ///
    /// In pan mode this starts a pan. With Ctrl/Cmd held it toggles the
    /// element's membership without dragging. Otherwise the element is
    /// selected (keeping an existing multi-selection it belongs to) and a
    /// drag starts with it as the driving element.
    pub fn pointer_down_on_element(&mut self, id: ElementId, position: Point, modifiers: Modifiers) {
        self.finish_gesture();
        if self.viewport.pan_mode {
            self.begin_pan(position);
            return;
        }
        if !self.state.document.contains(id) {
            return;
        }
        if modifiers.command() {
            self.click(id, modifiers);
            return;
        }

        let before = self.state.selection.clone();
        if self.state.selection.contains(id) {
            self.state.selection.set_primary(id);
        } else {
            self.state.selection.replace(id);
        }
        self.notify_selection(&before);

        self.gesture = DragSession::begin(&self.state, id, position, &self.viewport).map(|session| {
            log::debug!("Drag started on {}", id);
            Gesture::Drag(session)
        });
    }

    /// Press on empty stage area; starts a pan in pan mode.
    pub fn pointer_down_on_stage(&mut self, position: Point) {
        self.finish_gesture();
        if self.viewport.pan_mode {
            self.begin_pan(position);
        }
    }

    fn begin_pan(&mut self, position: Point) {
        log::debug!("Pan started at ({}, {})", position.x, position.y);
        self.gesture = Some(Gesture::Pan(PanGesture::begin(&self.viewport, position)));
    }

    /// Pointer motion. Holding Shift skips grid snapping during a drag.
    pub fn pointer_move(&mut self, position: Point, modifiers: Modifiers) {
        match &self.gesture {
            Some(Gesture::Drag(session)) => {
                let Some(step) =
                    session.step(position, modifiers.shift, &self.viewport, &self.config)
                else {
                    return;
                };
                let moved = step.state.document != self.state.document;
                self.state = step.state;
                if moved {
                    self.notify_document();
                }
                self.set_guides(step.guides);
            }
            Some(Gesture::Pan(pan)) => {
                let pan = *pan;
                pan.update(&mut self.viewport, position);
                self.notify_viewport();
            }
            None => {}
        }
    }

    /// Release ends any gesture; a drag that moved something becomes one undo step.
    pub fn pointer_up(&mut self) {
        self.finish_gesture();
    }

    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down {
                position,
                target: Some(id),
                modifiers,
            } => self.pointer_down_on_element(id, position, modifiers),
            PointerEvent::Down {
                position,
                target: None,
                ..
            } => self.pointer_down_on_stage(position),
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(position, modifiers),
            PointerEvent::Up { .. } => self.pointer_up(),
            PointerEvent::Wheel { delta_y } => self.wheel(delta_y),
        }
    }

    fn finish_gesture(&mut self) {
        match self.gesture.take() {
            Some(Gesture::Drag(session)) => {
                if let Some(origin) = session.finish(&self.state) {
                    log::debug!("Drag committed");
                    self.history.record(origin);
                    self.notify_history();
                }
                self.set_guides(Guides::default());
            }
            Some(Gesture::Pan(_)) => log::debug!("Pan ended"),
            None => {}
        }
    }

    // --- Viewport -------------------------------------------------------

    pub fn wheel(&mut self, delta_y: f64) {
        if self.viewport.wheel(delta_y) {
            self.notify_viewport();
        }
    }

    pub fn zoom_in(&mut self) {
        if self.viewport.zoom_in() {
            self.notify_viewport();
        }
    }

    pub fn zoom_out(&mut self) {
        if self.viewport.zoom_out() {
            self.notify_viewport();
        }
    }

    /// Back to 100% zoom with no pan.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
        self.notify_viewport();
    }

    pub fn toggle_pan_mode(&mut self) -> bool {
        self.viewport.pan_mode = !self.viewport.pan_mode;
        self.notify_viewport();
        self.viewport.pan_mode
    }

    // --- Keyboard -------------------------------------------------------

    /// Run the action bound to `chord`, if any. Returns the resolved action.
    pub fn handle_key(&mut self, chord: &KeyChord, confirm: &mut dyn Confirm) -> Option<ShortcutAction> {
        let action = chord.resolve()?;
        match action {
            ShortcutAction::Delete => {
                self.delete_selected(confirm);
            }
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Duplicate => {
                self.duplicate_selected();
            }
        }
        Some(action)
    }

    // --- Import / export / persistence ---------------------------------

    /// Replace the document with elements imported from untrusted markup.
    /// Markup that yields nothing leaves the editor untouched.
    pub fn import_html(&mut self, raw: &str, measurer: &dyn Measure) -> bool {
        let elements = html::import_elements(raw, measurer, self.config.canvas_size);
        if elements.is_empty() {
            log::info!("Import produced no elements");
            return false;
        }
        log::info!("Imported {} elements", elements.len());
        let next = self.state.replace_all(elements);
        self.commit(next);
        true
    }

    pub fn export_html(&self) -> String {
        html::export_html(&self.state.document, self.config.canvas_size)
    }

    pub fn export_file(&self) -> ExportedFile {
        ExportedFile::html(self.export_html())
    }

    pub fn save_project(&self, storage: &dyn Storage) -> StorageResult<()> {
        storage::save_project(storage, &self.state.document)
    }

    /// Replace the document with the saved project as one undo step.
    /// Missing, empty or unreadable projects are ignored.
    pub fn load_project(&mut self, storage: &dyn Storage) -> bool {
        match storage::load_project(storage) {
            Ok(Some(document)) => {
                let next = EditorState::new(document);
                self.commit(next);
                true
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("Ignoring saved project: {}", e);
                false
            }
        }
    }

    pub fn clear_project(&self, storage: &dyn Storage) -> StorageResult<()> {
        storage::clear_project(storage)
    }

    // --- Internals ------------------------------------------------------

    /// Install `next` as one undo step.
    fn commit(&mut self, next: EditorState) {
        self.finish_gesture();
        let before = self.state.clone();
        self.history.commit(&mut self.state, next);
        log::debug!(
            "Committed: {} elements, undo depth {}",
            self.state.document.len(),
            self.history.undo_depth()
        );
        self.notify_state(&before);
        self.notify_history();
    }

    fn set_guides(&mut self, guides: Guides) {
        if guides != self.guides {
            self.guides = guides;
            self.events.emit(EditorEvent::GuidesChanged(self.guides.clone()));
        }
    }

    fn notify_state(&mut self, before: &EditorState) {
        if before.document != self.state.document {
            self.notify_document();
        }
        self.notify_selection(&before.selection);
    }

    fn notify_document(&mut self) {
        self.events.emit(EditorEvent::DocumentChanged {
            element_count: self.state.document.len(),
        });
    }

    fn notify_selection(&mut self, before: &Selection) {
        if *before != self.state.selection {
            self.events.emit(EditorEvent::SelectionChanged {
                selected: self.state.selection.ids().to_vec(),
                primary: self.state.selection.primary(),
            });
        }
    }

    fn notify_viewport(&mut self) {
        self.events.emit(EditorEvent::ViewportChanged {
            zoom: self.viewport.zoom,
            pan: self.viewport.pan,
            pan_mode: self.viewport.pan_mode,
        });
    }

    fn notify_history(&mut self) {
        self.events.emit(EditorEvent::HistoryChanged {
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        });
    }
}

/// The demo poster shown on first launch.
pub fn sample_document() -> Document {
    let headline = TextElement::new(Point::new(40.0, 40.0), "Summer Sale").with_styles(ElementStyle {
        font_size: Some(36.0),
        font_weight: Some(FontWeight::BOLD),
        color: Some(INK),
        ..Default::default()
    });
    let subtitle = TextElement::new(Point::new(40.0, 100.0), "Up to 50% off on select items!")
        .with_styles(ElementStyle {
            font_size: Some(20.0),
            color: Some(Color::rgb(0x44, 0x44, 0x44)),
            ..Default::default()
        });
    let image = ImageElement::new(Point::new(420.0, 60.0), "https://placehold.co/240x240/png")
        .with_size(240.0, 240.0)
        .with_alt("placeholder")
        .with_styles(ElementStyle {
            border_radius: Some(8.0),
            ..Default::default()
        });
    Document::from_elements([headline.into(), subtitle.into(), image.into()])
}
