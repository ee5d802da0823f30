//! Turning arbitrary markup into poster elements.

use super::measure::{Measure, MeasuredNode, NodeKind};
use super::sanitize::sanitize_html;
use crate::element::{Element, ElementStyle, ImageElement, TextElement};
use kurbo::Point;

/// Round a measured length; zero means "size to content".
fn measured_length(value: f64) -> Option<f64> {
    let rounded = value.round();
    (rounded.is_finite() && rounded != 0.0).then_some(rounded)
}

/// Round and clamp a measured coordinate; non-finite input lands on 0.
fn measured_coordinate(value: f64, canvas_size: f64) -> f64 {
    if value.is_finite() {
        value.round().clamp(0.0, canvas_size)
    } else {
        0.0
    }
}

fn to_element(node: &MeasuredNode, canvas_size: f64) -> Option<Element> {
    let position = Point::new(
        measured_coordinate(node.bounds.x0, canvas_size),
        measured_coordinate(node.bounds.y0, canvas_size),
    );

    match &node.kind {
        NodeKind::Image { src, alt } if !src.is_empty() => {
            let mut image = ImageElement::new(position, src.clone());
            image.width = measured_length(node.bounds.width());
            image.height = measured_length(node.bounds.height());
            image.alt = alt.clone().filter(|a| !a.is_empty());
            Some(image.into())
        }
        NodeKind::Image { .. } => None,
        NodeKind::Other { .. } => {
            let content = node.text.trim();
            if node.has_element_children || content.is_empty() {
                return None;
            }
            let styles = ElementStyle {
                color: node.color,
                font_size: node
                    .font_size
                    .map(f64::trunc)
                    .filter(|s| s.is_finite() && *s > 0.0),
                ..Default::default()
            };
            Some(TextElement::new(position, content).with_styles(styles).into())
        }
    }
}

/// Sanitize `raw`, measure it with `measurer` and convert the result.
///
/// Images with a source become image elements sized from their layout; leaf
/// elements with visible text become text elements carrying their computed
/// color and font size. Positions are rounded and clamped to the canvas.
pub fn import_elements(raw: &str, measurer: &dyn Measure, canvas_size: f64) -> Vec<Element> {
    let fragment = sanitize_html(raw);
    if fragment.is_empty() {
        log::info!("Import found no renderable markup");
        return Vec::new();
    }

    let elements: Vec<Element> = measurer
        .measure(&fragment)
        .iter()
        .filter_map(|node| to_element(node, canvas_size))
        .collect();
    log::info!("Imported {} elements from HTML", elements.len());
    elements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::element::Color;
    use crate::html::export::export_html;
    use crate::html::measure::StaticLayout;
    use crate::html::sanitize::Fragment;
    use kurbo::Rect;

    #[test]
    fn test_script_dropped_image_kept() {
        let raw = r#"<div><script>alert(1)</script><img src="https://example.com/a.png" width="100" height="50"></div>"#;
        let elements = import_elements(raw, &StaticLayout::default(), 720.0);
        assert_eq!(elements.len(), 1);
        let image = elements[0].as_image().unwrap();
        assert_eq!(image.src, "https://example.com/a.png");
        assert_eq!(image.width, Some(100.0));
        assert_eq!(image.height, Some(50.0));
        for element in &elements {
            if let Some(text) = element.as_text() {
                assert!(!text.content.contains("alert"));
            }
        }
    }

    #[test]
    fn test_round_trip_through_export() {
        let text = TextElement::new(Point::new(40.0, 100.0), "Up to 50% off").with_styles(ElementStyle {
            font_size: Some(20.0),
            color: Some(Color::rgb(68, 68, 68)),
            ..Default::default()
        });
        let image = ImageElement::new(Point::new(420.0, 60.0), "https://placehold.co/240x240/png")
            .with_size(240.0, 240.0)
            .with_alt("placeholder");
        let doc = Document::from_elements([Element::from(text), Element::from(image)]);

        let imported = import_elements(&export_html(&doc, 720.0), &StaticLayout::default(), 720.0);
        assert_eq!(imported.len(), 2);

        let text = imported[0].as_text().unwrap();
        assert_eq!(text.content, "Up to 50% off");
        assert_eq!((text.x, text.y), (40.0, 100.0));
        assert_eq!(text.styles.font_size, Some(20.0));
        assert_eq!(text.styles.color, Some(Color::rgb(68, 68, 68)));

        let image = imported[1].as_image().unwrap();
        assert_eq!((image.x, image.y), (420.0, 60.0));
        assert_eq!(image.width, Some(240.0));
        assert_eq!(image.alt.as_deref(), Some("placeholder"));
    }

    #[test]
    fn test_positions_clamped_and_rounded() {
        let measurer = |_: &Fragment| -> Vec<MeasuredNode> {
            vec![MeasuredNode {
                kind: NodeKind::Other { tag: "p".to_string() },
                bounds: Rect::new(-12.4, 800.6, 100.0, 820.0),
                has_element_children: false,
                text: "  Hello  ".to_string(),
                color: None,
                font_size: Some(18.7),
            }]
        };
        let elements = import_elements("<p>Hello</p>", &measurer, 720.0);
        let text = elements[0].as_text().unwrap();
        assert_eq!((text.x, text.y), (0.0, 720.0));
        assert_eq!(text.content, "Hello");
        assert_eq!(text.styles.font_size, Some(18.0));
        assert_eq!(text.width, None);
    }

    #[test]
    fn test_zero_sized_image_has_intrinsic_size() {
        let elements = import_elements(r#"<img src="a.png">"#, &StaticLayout::default(), 720.0);
        let image = elements[0].as_image().unwrap();
        assert_eq!(image.width, None);
        assert_eq!(image.height, None);
    }

    #[test]
    fn test_nothing_renderable() {
        let layout = StaticLayout::default();
        assert!(import_elements("<script>x</script>", &layout, 720.0).is_empty());
        assert!(import_elements("<div> <br> </div>", &layout, 720.0).is_empty());
        assert!(import_elements(r#"<img alt="no source">"#, &layout, 720.0).is_empty());
    }

    #[test]
    fn test_containers_are_skipped() {
        let elements = import_elements(
            "<div><p>One</p><p>Two</p></div>",
            &StaticLayout::default(),
            720.0,
        );
        let contents: Vec<_> = elements
            .iter()
            .filter_map(|e| e.as_text().map(|t| t.content.clone()))
            .collect();
        assert_eq!(contents, vec!["One", "Two"]);
    }

    #[test]
    fn test_non_finite_lengths_are_ignored() {
        let raw = r#"<div style="position:absolute;left:NaN;top:10px;font-size:inf">Hi</div>"#;
        let elements = import_elements(raw, &StaticLayout::default(), 720.0);
        let text = elements[0].as_text().unwrap();
        assert_eq!((text.x, text.y), (0.0, 10.0));
        assert_eq!(text.styles.font_size, Some(16.0));

        let project = crate::storage::Project { elements };
        let reloaded = crate::storage::Project::from_json(&project.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.elements, project.elements);
    }

    #[test]
    fn test_non_finite_measured_bounds_land_on_origin() {
        let measurer = |_: &Fragment| -> Vec<MeasuredNode> {
            vec![MeasuredNode {
                kind: NodeKind::Image {
                    src: "a.png".to_string(),
                    alt: None,
                },
                bounds: Rect::new(f64::NAN, f64::NEG_INFINITY, f64::INFINITY, 40.0),
                has_element_children: false,
                text: String::new(),
                color: None,
                font_size: Some(f64::INFINITY),
            }]
        };
        let elements = import_elements(r#"<img src="a.png">"#, &measurer, 720.0);
        let image = elements[0].as_image().unwrap();
        assert_eq!((image.x, image.y), (0.0, 0.0));
        assert_eq!(image.width, None);
        assert_eq!(image.height, None);
    }
}
