//! Change notifications for GUI layers.

use crate::element::ElementId;
use crate::snap::Guides;
use kurbo::Vec2;

/// Something observable about the editor changed.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    DocumentChanged { element_count: usize },
    SelectionChanged { selected: Vec<ElementId>, primary: Option<ElementId> },
    ViewportChanged { zoom: f64, pan: Vec2, pan_mode: bool },
    GuidesChanged(Guides),
    HistoryChanged { can_undo: bool, can_redo: bool },
}

pub trait EventHandler {
    fn handle_event(&mut self, event: &EditorEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&EditorEvent),
{
    fn handle_event(&mut self, event: &EditorEvent) {
        self(event)
    }
}

/// Broadcasts editor events to registered handlers.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &format!("<{} handlers>", self.handlers.len()))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to receive events.
    pub fn subscribe(&mut self, handler: Box<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Emit an event to all registered handlers.
    pub fn emit(&mut self, event: EditorEvent) {
        for handler in &mut self.handlers {
            handler.handle_event(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
