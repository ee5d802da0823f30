//! Drag gesture state for moving elements.

use crate::config::EditorConfig;
use crate::document::EditorState;
use crate::element::ElementId;
use crate::snap::{Guides, clamp_to_canvas, snap_position};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};

/// State of an active element drag.
///
/// The primary element drives the drag; every other selected element follows
/// it by the same delta.
#[derive(Debug, Clone)]
pub struct DragSession {
    /// The element under the pointer.
    driving: ElementId,
    /// Pointer position relative to the driving element's top-left, in canvas units.
    grab_offset: Vec2,
    /// State before the drag began, recorded in history when it ends.
    origin: EditorState,
}

/// Outcome of one pointer move during a drag.
#[derive(Debug, Clone)]
pub struct DragStep {
    pub state: EditorState,
    pub guides: Guides,
}

impl DragSession {
    /// Start dragging `driving`, grabbed at `pointer` (screen coordinates).
    ///
    /// Returns `None` if the element does not exist.
    pub fn begin(
        state: &EditorState,
        driving: ElementId,
        pointer: Point,
        viewport: &Viewport,
    ) -> Option<Self> {
        let element = state.document.get(driving)?;
        let grab_offset = viewport.screen_to_canvas(pointer) - element.position();
        Some(Self {
            driving,
            grab_offset,
            origin: state.clone(),
        })
    }

    pub fn driving(&self) -> ElementId {
        self.driving
    }

    /// The state captured when the drag began.
    pub fn origin(&self) -> &EditorState {
        &self.origin
    }

    /// Compute the live state for a pointer at `pointer` (screen coordinates).
    ///
    /// Holding the grid bypass modifier skips grid snapping; alignment
    /// snapping and clamping always apply.
    pub fn step(
        &self,
        pointer: Point,
        bypass_grid: bool,
        viewport: &Viewport,
        config: &EditorConfig,
    ) -> Option<DragStep> {
        let driving = self.origin.document.get(self.driving)?;
        let candidate = viewport.screen_to_canvas(pointer) - self.grab_offset;

        let moving = &self.origin.selection;
        let others: Vec<Rect> = self
            .origin
            .document
            .iter()
            .filter(|e| e.id() != self.driving && !moving.contains(e.id()))
            .map(|e| e.bounds())
            .collect();

        let snapped = snap_position(candidate, driving.extent(), &others, bypass_grid, config);
        let delta = snapped.point - driving.position();

        let mut positions = vec![(self.driving, snapped.point)];
        for element in self.origin.selected_elements() {
            if element.id() == self.driving {
                continue;
            }
            let target = clamp_to_canvas(
                element.position() + delta,
                element.extent(),
                config.canvas_size,
            );
            positions.push((element.id(), target));
        }

        log::trace!(
            "Drag step for {} to ({}, {})",
            self.driving,
            snapped.point.x,
            snapped.point.y
        );

        Some(DragStep {
            state: self.origin.with_positions(&positions),
            guides: snapped.guides,
        })
    }

    /// End the drag. Returns the pre-drag state when `live` differs from it,
    /// so the caller can record exactly one history entry.
    pub fn finish(self, live: &EditorState) -> Option<EditorState> {
        (self.origin != *live).then_some(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::element::{Element, ImageElement, TextElement};

    fn text(x: f64, y: f64) -> Element {
        TextElement::new(Point::new(x, y), "t").into()
    }

    fn boxed(x: f64, y: f64, w: f64, h: f64) -> Element {
        ImageElement::new(Point::new(x, y), "a.png").with_size(w, h).into()
    }

    #[test]
    fn test_single_drag_snaps_to_center() {
        let element = text(40.0, 40.0);
        let id = element.id();
        let mut state = EditorState::new(Document::from_elements([element]));
        state.selection.replace(id);
        let viewport = Viewport::new();
        let config = EditorConfig::default();

        let session = DragSession::begin(&state, id, Point::new(40.0, 40.0), &viewport).unwrap();
        let step = session
            .step(Point::new(358.0, 40.0), false, &viewport, &config)
            .unwrap();
        assert_eq!(step.state.document.get(id).unwrap().position(), Point::new(360.0, 40.0));
        assert_eq!(step.guides.vertical, vec![360.0]);
    }

    #[test]
    fn test_grab_offset_respects_zoom_and_pan() {
        let element = boxed(100.0, 100.0, 50.0, 50.0);
        let id = element.id();
        let mut state = EditorState::new(Document::from_elements([element]));
        state.selection.replace(id);
        let mut viewport = Viewport::new();
        viewport.zoom = 2.0;
        viewport.pan = Vec2::new(10.0, 10.0);
        let config = EditorConfig::default();

        // Canvas (110, 110) is 10 units inside the element.
        let session = DragSession::begin(&state, id, Point::new(230.0, 230.0), &viewport).unwrap();
        // Canvas pointer (150, 130) puts the corner at (140, 120).
        let step = session
            .step(Point::new(310.0, 270.0), true, &viewport, &config)
            .unwrap();
        assert_eq!(step.state.document.get(id).unwrap().position(), Point::new(140.0, 120.0));
    }

    #[test]
    fn test_multi_drag_moves_followers_and_clamps() {
        let lead = boxed(100.0, 100.0, 50.0, 50.0);
        let follower = boxed(20.0, 400.0, 50.0, 50.0);
        let bystander = boxed(600.0, 600.0, 20.0, 20.0);
        let (lead_id, follower_id, bystander_id) = (lead.id(), follower.id(), bystander.id());
        let mut state = EditorState::new(Document::from_elements([lead, follower, bystander]));
        state.selection.replace(follower_id);
        state.selection.toggle(lead_id);
        let viewport = Viewport::new();
        let config = EditorConfig::default();

        let session =
            DragSession::begin(&state, lead_id, Point::new(100.0, 100.0), &viewport).unwrap();
        let step = session
            .step(Point::new(60.0, 130.0), true, &viewport, &config)
            .unwrap();
        let doc = &step.state.document;
        assert_eq!(doc.get(lead_id).unwrap().position(), Point::new(60.0, 130.0));
        // Follower moved by (-40, 30) and clamped at the left edge.
        assert_eq!(doc.get(follower_id).unwrap().position(), Point::new(0.0, 430.0));
        assert_eq!(doc.get(bystander_id).unwrap().position(), Point::new(600.0, 600.0));
    }

    #[test]
    fn test_every_step_stays_in_bounds() {
        let element = boxed(10.0, 10.0, 100.0, 60.0);
        let id = element.id();
        let mut state = EditorState::new(Document::from_elements([element]));
        state.selection.replace(id);
        let viewport = Viewport::new();
        let config = EditorConfig::default();
        let session = DragSession::begin(&state, id, Point::new(10.0, 10.0), &viewport).unwrap();

        for (x, y) in [(-500.0, -500.0), (2000.0, 3.0), (719.0, 719.0), (333.3, -1.0)] {
            let step = session.step(Point::new(x, y), false, &viewport, &config).unwrap();
            let bounds = step.state.document.get(id).unwrap().bounds();
            assert!(bounds.x0 >= 0.0 && bounds.y0 >= 0.0);
            assert!(bounds.x1 <= 720.0 && bounds.y1 <= 720.0);
        }
    }

    #[test]
    fn test_selected_elements_are_not_snap_references() {
        let lead = boxed(100.0, 100.0, 50.0, 50.0);
        let follower = boxed(303.0, 400.0, 50.0, 50.0);
        let bystander = boxed(600.0, 200.0, 50.0, 20.0);
        let (lead_id, follower_id) = (lead.id(), follower.id());
        let mut state = EditorState::new(Document::from_elements([lead, follower, bystander]));
        state.selection.replace(lead_id);
        state.selection.toggle(follower_id);
        let viewport = Viewport::new();
        let config = EditorConfig::default();

        // Left edge at 300 is 3 from the follower's left edge; top edge at
        // 198 is 2 from the bystander's top edge.
        let session =
            DragSession::begin(&state, lead_id, Point::new(100.0, 100.0), &viewport).unwrap();
        let step = session
            .step(Point::new(300.0, 198.0), true, &viewport, &config)
            .unwrap();
        let doc = &step.state.document;
        assert_eq!(doc.get(lead_id).unwrap().position(), Point::new(300.0, 200.0));
        assert!(step.guides.vertical.is_empty());
        assert_eq!(step.guides.horizontal, vec![200.0]);
        assert_eq!(doc.get(follower_id).unwrap().position(), Point::new(503.0, 500.0));

        // Once deselected, the same element attracts the drag.
        state.selection.replace(lead_id);
        let session =
            DragSession::begin(&state, lead_id, Point::new(100.0, 100.0), &viewport).unwrap();
        let step = session
            .step(Point::new(300.0, 198.0), true, &viewport, &config)
            .unwrap();
        assert_eq!(
            step.state.document.get(lead_id).unwrap().position(),
            Point::new(303.0, 200.0)
        );
        assert!(step.guides.vertical.contains(&303.0));
    }

    #[test]
    fn test_finish_without_movement() {
        let element = text(40.0, 40.0);
        let id = element.id();
        let mut state = EditorState::new(Document::from_elements([element]));
        state.selection.replace(id);
        let viewport = Viewport::new();
        let session = DragSession::begin(&state, id, Point::new(45.0, 45.0), &viewport).unwrap();
        assert!(session.finish(&state).is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn within(value: f64, extent: f64, canvas_size: f64) -> bool {
            value >= 0.0 && value <= (canvas_size - extent).max(0.0)
        }

        proptest! {
            #[test]
            fn prop_drag_keeps_selection_on_canvas(
                lead_size in (1.0..800.0f64, 1.0..800.0f64),
                follower_size in (1.0..400.0f64, 1.0..400.0f64),
                follower_at in (0.0..720.0f64, 0.0..720.0f64),
                grab in (0.0..1.0f64, 0.0..1.0f64),
                pointer in (-2000.0..3000.0f64, -2000.0..3000.0f64),
                zoom in 0.25..4.0f64,
                pan in (-500.0..500.0f64, -500.0..500.0f64),
                bypass_grid in any::<bool>(),
            ) {
                let lead = boxed(10.0, 10.0, lead_size.0, lead_size.1);
                let follower = boxed(follower_at.0, follower_at.1, follower_size.0, follower_size.1);
                let bystander = boxed(360.0, 360.0, 40.0, 40.0);
                let (lead_id, follower_id) = (lead.id(), follower.id());
                let mut state =
                    EditorState::new(Document::from_elements([lead, follower, bystander]));
                state.selection.replace(lead_id);
                state.selection.toggle(follower_id);
                let mut viewport = Viewport::new();
                viewport.zoom = zoom;
                viewport.pan = Vec2::new(pan.0, pan.1);
                let config = EditorConfig::default();

                let press = viewport.canvas_to_screen(Point::new(
                    10.0 + grab.0 * lead_size.0,
                    10.0 + grab.1 * lead_size.1,
                ));
                let session = DragSession::begin(&state, lead_id, press, &viewport).unwrap();
                let step = session
                    .step(Point::new(pointer.0, pointer.1), bypass_grid, &viewport, &config)
                    .unwrap();

                for id in [lead_id, follower_id] {
                    let element = step.state.document.get(id).unwrap();
                    let (position, extent) = (element.position(), element.extent());
                    prop_assert!(within(position.x, extent.width, config.canvas_size), "x {} for width {}", position.x, extent.width);
                    prop_assert!(within(position.y, extent.height, config.canvas_size), "y {} for height {}", position.y, extent.height);
                }
            }
        }
    }
}
