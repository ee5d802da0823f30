//! Poster document and the editable state transitions over it.

use crate::element::{Element, ElementId, ElementPatch};
use crate::selection::Selection;
use crate::snap::clamp_to_canvas;
use kurbo::{Point, Vec2};
use std::collections::HashSet;

/// Ordered collection of elements; later elements paint on top.
///
/// No two elements share an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from `elements`, giving any element whose id was
    /// already seen a fresh one.
    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let mut seen = HashSet::new();
        let elements = elements
            .into_iter()
            .map(|element| {
                if seen.insert(element.id()) {
                    element
                } else {
                    log::warn!("Regenerating duplicate element id {}", element.id());
                    let fresh = element.with_fresh_id();
                    seen.insert(fresh.id());
                    fresh
                }
            })
            .collect();
        Self { elements }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    /// Swap in `element` for the element sharing its id.
    /// Returns false when no such element exists.
    fn replace(&mut self, element: Element) -> bool {
        match self.index_of(element.id()) {
            Some(index) => {
                self.elements[index] = element;
                true
            }
            None => false,
        }
    }
}

/// The part of the editor state captured by history snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    pub document: Document,
    pub selection: Selection,
}

impl EditorState {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            selection: Selection::new(),
        }
    }

    /// The primary selected element, if any.
    pub fn primary_element(&self) -> Option<&Element> {
        self.selection.primary().and_then(|id| self.document.get(id))
    }

    /// Selected elements in document order.
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.document
            .iter()
            .filter(|e| self.selection.contains(e.id()))
            .collect()
    }

    /// Append `element` and make it the only selection.
    pub fn add_element(&self, element: Element) -> Self {
        let id = element.id();
        let mut document = self.document.clone();
        document.elements.push(element);
        Self {
            document,
            selection: Selection::single(id),
        }
    }

    /// Remove every element in `ids` and clear the selection.
    pub fn remove_elements(&self, ids: &[ElementId]) -> Self {
        let document = Document {
            elements: self
                .document
                .iter()
                .filter(|e| !ids.contains(&e.id()))
                .cloned()
                .collect(),
        };
        Self {
            document,
            selection: Selection::new(),
        }
    }

    /// Merge `patch` into element `id`. Returns `None` if `id` is unknown.
    pub fn update_element(&self, id: ElementId, patch: &ElementPatch) -> Option<Self> {
        let updated = self.document.get(id)?.with_patch(patch);
        let mut next = self.clone();
        next.document.replace(updated);
        Some(next)
    }

    /// Copy the elements in `ids` with fresh ids, shifted by `offset` and
    /// kept inside a canvas of `canvas_size`.
    ///
    /// Copies are appended in document order and become the selection, the
    /// first copy being primary. Returns `None` when nothing matched.
    pub fn duplicate_elements(
        &self,
        ids: &[ElementId],
        offset: Vec2,
        canvas_size: f64,
    ) -> Option<Self> {
        let copies: Vec<Element> = self
            .document
            .iter()
            .filter(|e| ids.contains(&e.id()))
            .map(|e| {
                let copy = e.duplicated(offset);
                let position = clamp_to_canvas(copy.position(), copy.extent(), canvas_size);
                copy.moved_to(position)
            })
            .collect();
        if copies.is_empty() {
            return None;
        }
        let selection = Selection::from_ids(copies.iter().map(Element::id));
        let mut document = self.document.clone();
        document.elements.extend(copies);
        Some(Self {
            document,
            selection,
        })
    }

    /// Replace the whole document and clear the selection.
    pub fn replace_all(&self, elements: Vec<Element>) -> Self {
        Self::new(Document::from_elements(elements))
    }

    /// Move elements to new top-left positions; unknown ids are skipped.
    pub fn with_positions(&self, positions: &[(ElementId, Point)]) -> Self {
        let mut next = self.clone();
        for &(id, position) in positions {
            if let Some(moved) = next.document.get(id).map(|e| e.moved_to(position)) {
                next.document.replace(moved);
            }
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ImageElement, TextElement};

    fn text_at(x: f64, y: f64, content: &str) -> Element {
        TextElement::new(Point::new(x, y), content).into()
    }

    fn sample_state() -> EditorState {
        let image: Element = ImageElement::new(Point::new(420.0, 60.0), "a.png")
            .with_size(240.0, 240.0)
            .into();
        EditorState::new(Document::from_elements([
            text_at(40.0, 40.0, "Summer Sale"),
            text_at(40.0, 100.0, "Up to 50% off"),
            image,
        ]))
    }

    #[test]
    fn test_add_element_selects_it() {
        let state = sample_state();
        let added = text_at(60.0, 60.0, "New Text");
        let id = added.id();
        let next = state.add_element(added);
        assert_eq!(next.document.len(), 4);
        assert_eq!(next.document.elements()[3].id(), id);
        assert_eq!(next.selection.ids(), &[id]);
        assert_eq!(next.selection.primary(), Some(id));
        // Input untouched.
        assert_eq!(state.document.len(), 3);
    }

    #[test]
    fn test_remove_elements_clears_selection() {
        let state = sample_state();
        let first = state.document.elements()[0].id();
        let mut selected = state.clone();
        selected.selection.replace(first);
        let next = selected.remove_elements(&[first]);
        assert_eq!(next.document.len(), 2);
        assert!(!next.document.contains(first));
        assert!(next.selection.is_empty());
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let state = sample_state();
        assert!(
            state
                .update_element(uuid::Uuid::new_v4(), &ElementPatch::content("x"))
                .is_none()
        );
    }

    #[test]
    fn test_update_keeps_order() {
        let state = sample_state();
        let id = state.document.elements()[1].id();
        let next = state
            .update_element(id, &ElementPatch::content("Everything must go"))
            .unwrap();
        assert_eq!(next.document.elements()[1].id(), id);
        assert_eq!(
            next.document.elements()[1].as_text().unwrap().content,
            "Everything must go"
        );
    }

    #[test]
    fn test_duplicate_in_document_order() {
        let state = sample_state();
        let ids: Vec<_> = state.document.iter().map(Element::id).collect();
        // Request order differs from document order.
        let next = state
            .duplicate_elements(&[ids[2], ids[0]], Vec2::new(10.0, 10.0), 720.0)
            .unwrap();
        assert_eq!(next.document.len(), 5);
        let copies = &next.document.elements()[3..];
        assert_eq!(copies[0].as_text().unwrap().content, "Summer Sale");
        assert_eq!(copies[0].position(), Point::new(50.0, 50.0));
        assert_eq!(copies[1].position(), Point::new(430.0, 70.0));
        assert_eq!(next.selection.ids(), &[copies[0].id(), copies[1].id()]);
        assert_eq!(next.selection.primary(), Some(copies[0].id()));
        let unique: HashSet<_> = next.document.iter().map(Element::id).collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_duplicate_nothing_selected() {
        let state = sample_state();
        assert!(state.duplicate_elements(&[], Vec2::new(10.0, 10.0), 720.0).is_none());
    }

    #[test]
    fn test_duplicate_stays_on_canvas() {
        let edge: Element = ImageElement::new(Point::new(715.0, 712.0), "a.png")
            .with_size(5.0, 8.0)
            .into();
        let text = text_at(715.0, 2.0, "corner");
        let ids = [edge.id(), text.id()];
        let state = EditorState::new(Document::from_elements([edge, text]));

        let next = state.duplicate_elements(&ids, Vec2::new(10.0, 10.0), 720.0).unwrap();
        let copies = &next.document.elements()[2..];
        assert_eq!(copies[0].position(), Point::new(715.0, 712.0));
        assert_eq!(copies[1].position(), Point::new(720.0, 12.0));
        assert_eq!(next.document.elements()[0].position(), Point::new(715.0, 712.0));
    }

    #[test]
    fn test_from_elements_regenerates_duplicate_ids() {
        let a = text_at(0.0, 0.0, "a");
        let doc = Document::from_elements([a.clone(), a.clone()]);
        assert_eq!(doc.len(), 2);
        assert_eq!(doc.elements()[0].id(), a.id());
        assert_ne!(doc.elements()[1].id(), a.id());
    }

    #[test]
    fn test_with_positions() {
        let state = sample_state();
        let id = state.document.elements()[0].id();
        let next = state.with_positions(&[(id, Point::new(100.0, 120.0))]);
        assert_eq!(next.document.get(id).unwrap().position(), Point::new(100.0, 120.0));
    }
}
