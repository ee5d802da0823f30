//! Selection state.

use crate::element::ElementId;
use serde::{Deserialize, Serialize};

/// Ordered set of selected elements plus the primary element.
///
/// The primary element drives drags and the property panel. It is always a
/// member of the selection, and it is `None` exactly when nothing is selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<ElementId>,
    primary: Option<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection holding only `id`.
    pub fn single(id: ElementId) -> Self {
        Self {
            ids: vec![id],
            primary: Some(id),
        }
    }

    /// A selection of `ids` (duplicates dropped) with the first as primary.
    pub fn from_ids(ids: impl IntoIterator<Item = ElementId>) -> Self {
        let mut selection = Self::new();
        for id in ids {
            if !selection.contains(id) {
                selection.ids.push(id);
            }
        }
        selection.primary = selection.ids.first().copied();
        selection
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn primary(&self) -> Option<ElementId> {
        self.primary
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Replace the selection with `id`.
    pub fn replace(&mut self, id: ElementId) {
        *self = Self::single(id);
    }

    /// Toggle membership of `id`.
    ///
    /// Adding makes `id` primary. Removing hands primary to the most recently
    /// added remaining member, or clears it when nothing is left.
    pub fn toggle(&mut self, id: ElementId) {
        if let Some(index) = self.ids.iter().position(|&i| i == id) {
            self.ids.remove(index);
            if self.primary == Some(id) {
                self.primary = self.ids.last().copied();
            }
        } else {
            self.ids.push(id);
            self.primary = Some(id);
        }
    }

    /// Make `id` primary if it is already selected. Returns false otherwise.
    pub fn set_primary(&mut self, id: ElementId) -> bool {
        if self.contains(id) {
            self.primary = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.primary = None;
    }

    /// Drop members for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementId) -> bool) {
        self.ids.retain(|&id| keep(id));
        if self.primary.is_some_and(|p| !self.ids.contains(&p)) {
            self.primary = self.ids.last().copied();
        }
    }

    /// Check the primary/membership invariant.
    pub fn is_consistent(&self) -> bool {
        match self.primary {
            Some(p) => self.ids.contains(&p),
            None => self.ids.is_empty(),
        }
    }
}
