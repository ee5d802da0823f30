//! Invariants that must hold for any sequence of editing operations.

use kurbo::Point;
use posterkit_core::{Document, Editor, EditorConfig, Element, ElementId, Modifiers};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    AddText,
    AddImage,
    Click { index: usize, toggle: bool },
    Delete,
    Duplicate,
    SetContent(String),
    SetFontSize(u32),
    Drag { index: usize, to: (f64, f64), bypass_grid: bool },
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::AddText),
        Just(Op::AddImage),
        (any::<usize>(), any::<bool>()).prop_map(|(index, toggle)| Op::Click { index, toggle }),
        Just(Op::Delete),
        Just(Op::Duplicate),
        "[a-z ]{0,12}".prop_map(Op::SetContent),
        (1u32..200).prop_map(Op::SetFontSize),
        (any::<usize>(), -200.0..1000.0f64, -200.0..1000.0f64, any::<bool>()).prop_map(
            |(index, x, y, bypass_grid)| Op::Drag {
                index,
                to: (x, y),
                bypass_grid,
            }
        ),
    ]
}

fn nth_id(editor: &Editor, index: usize) -> Option<ElementId> {
    let elements = editor.document().elements();
    (!elements.is_empty()).then(|| elements[index % elements.len()].id())
}

fn apply(editor: &mut Editor, op: &Op) {
    match op {
        Op::AddText => {
            editor.add_text();
        }
        Op::AddImage => {
            editor.add_image();
        }
        Op::Click { index, toggle } => {
            if let Some(id) = nth_id(editor, *index) {
                let modifiers = if *toggle {
                    Modifiers::NONE.with_ctrl()
                } else {
                    Modifiers::NONE
                };
                editor.click(id, modifiers);
            }
        }
        Op::Delete => {
            editor.delete_selected(&mut |_: &str| true);
        }
        Op::Duplicate => {
            editor.duplicate_selected();
        }
        Op::SetContent(content) => {
            editor.set_text_content(content);
        }
        Op::SetFontSize(size) => {
            editor.set_font_size(&size.to_string());
        }
        Op::Drag {
            index,
            to,
            bypass_grid,
        } => {
            if let Some(id) = nth_id(editor, *index) {
                let grab = editor.document().get(id).map(Element::position).unwrap_or_default();
                let modifiers = if *bypass_grid {
                    Modifiers::NONE.with_shift()
                } else {
                    Modifiers::NONE
                };
                editor.pointer_down_on_element(id, grab, Modifiers::NONE);
                editor.pointer_move(Point::new(to.0, to.1), modifiers);
                editor.pointer_up();
            }
        }
    }
}

fn assert_on_canvas(document: &Document, canvas_size: f64) -> Result<(), TestCaseError> {
    for element in document.iter() {
        let position = element.position();
        let extent = element.extent();
        prop_assert!(position.x >= 0.0 && position.y >= 0.0, "{:?} left the canvas", position);
        prop_assert!(
            position.x <= (canvas_size - extent.width).max(0.0)
                && position.y <= (canvas_size - extent.height).max(0.0),
            "{:?} with extent {:?} overflows the canvas",
            position,
            extent
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_ids_unique_and_elements_on_canvas(ops in prop::collection::vec(arb_op(), 0..40)) {
        let config = EditorConfig::default();
        let mut editor = Editor::with_sample_document(config.clone());
        for op in &ops {
            apply(&mut editor, op);

            let ids: HashSet<_> = editor.document().iter().map(Element::id).collect();
            prop_assert_eq!(ids.len(), editor.document().len(), "duplicate id after {:?}", op);
            prop_assert!(editor.selection().is_consistent());
            for id in editor.selection().ids() {
                prop_assert!(ids.contains(id), "selected {} missing after {:?}", id, op);
            }
            assert_on_canvas(editor.document(), config.canvas_size)?;
        }
    }

    #[test]
    fn prop_undo_then_redo_restores_every_document(ops in prop::collection::vec(arb_op(), 0..30)) {
        let mut editor = Editor::with_sample_document(EditorConfig::default());
        // Document before and after every operation that became an undo step.
        let mut steps: Vec<(Document, Document)> = Vec::new();
        for op in &ops {
            let depth = editor.history().undo_depth();
            let before = editor.document().clone();
            apply(&mut editor, op);
            if editor.history().undo_depth() > depth {
                steps.push((before, editor.document().clone()));
            } else {
                prop_assert_eq!(editor.document(), &before, "{:?} changed the document without an undo step", op);
            }
        }
        let last = editor.document().clone();

        for (before, _) in steps.iter().rev() {
            prop_assert!(editor.undo());
            prop_assert_eq!(editor.document(), before);
        }
        prop_assert!(!editor.can_undo());

        for (_, after) in &steps {
            prop_assert!(editor.redo());
            prop_assert_eq!(editor.document(), after);
        }
        prop_assert!(!editor.can_redo());
        prop_assert_eq!(editor.document(), &last);
    }
}
