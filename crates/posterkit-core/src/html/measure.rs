//! Layout measurement of sanitized markup.
//!
//! Import needs to know where each node of pasted markup would be rendered.
//! A GUI host can answer that with a real layout engine by implementing
//! [`Measure`]; [`StaticLayout`] is a browser-free approximation that handles
//! the markup this editor exports and simple flowing documents.

use super::sanitize::{ElementNode, Fragment, Node};
use crate::element::Color;
use kurbo::{Point, Rect, Size};
use std::collections::HashMap;

/// What kind of element a measured node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Image { src: String, alt: Option<String> },
    Other { tag: String },
}

/// Layout facts about one element, relative to the canvas-sized container.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredNode {
    pub kind: NodeKind,
    pub bounds: Rect,
    pub has_element_children: bool,
    /// Concatenated descendant text.
    pub text: String,
    /// Computed text color.
    pub color: Option<Color>,
    /// Computed font size in px.
    pub font_size: Option<f64>,
}

/// Capability that lays out sanitized markup in a canvas-sized container.
pub trait Measure {
    /// Measure every element of `fragment`, in document order.
    fn measure(&self, fragment: &Fragment) -> Vec<MeasuredNode>;
}

impl<F> Measure for F
where
    F: Fn(&Fragment) -> Vec<MeasuredNode>,
{
    fn measure(&self, fragment: &Fragment) -> Vec<MeasuredNode> {
        self(fragment)
    }
}

const ROOT_FONT_SIZE: f64 = 16.0;
const LINE_HEIGHT: f64 = 1.2;
/// Average advance of a glyph relative to the font size.
const GLYPH_WIDTH: f64 = 0.5;

/// Approximate layout without a browser.
///
/// Supports absolute and relative positioning through `left`/`top`, explicit
/// `width`/`height` (style or attribute), block elements stacking vertically,
/// inline content flowing in lines with estimated glyph widths, and inherited
/// `color`/`font-size`. Margins, padding and floats are ignored.
#[derive(Debug, Clone)]
pub struct StaticLayout {
    pub container: Size,
}

impl StaticLayout {
    pub fn new(canvas_size: f64) -> Self {
        Self {
            container: Size::new(canvas_size, canvas_size),
        }
    }
}

impl Default for StaticLayout {
    fn default() -> Self {
        Self::new(720.0)
    }
}

impl Measure for StaticLayout {
    fn measure(&self, fragment: &Fragment) -> Vec<MeasuredNode> {
        let mut out = Vec::new();
        let root = Inherited {
            font_size: ROOT_FONT_SIZE,
            color: Color::black(),
            containing: Point::ZERO,
        };
        let mut flow = Flow::new(Point::ZERO, self.container.width);
        layout_nodes(&fragment.nodes, &root, &mut flow, &mut out);
        out
    }
}

#[derive(Debug, Clone, Copy)]
struct Inherited {
    font_size: f64,
    color: Color,
    /// Origin of the nearest positioned ancestor.
    containing: Point,
}

/// Cursor state for laying out the children of one box.
struct Flow {
    origin: Point,
    width: f64,
    /// Top of the current line.
    y: f64,
    /// Horizontal position in the current line.
    x: f64,
    line_height: f64,
}

impl Flow {
    fn new(origin: Point, width: f64) -> Self {
        Self {
            origin,
            width,
            y: origin.y,
            x: origin.x,
            line_height: 0.0,
        }
    }

    fn at_line_start(&self) -> bool {
        self.x <= self.origin.x
    }

    fn remaining(&self) -> f64 {
        (self.origin.x + self.width - self.x).max(0.0)
    }

    fn break_line(&mut self) {
        self.y += self.line_height;
        self.x = self.origin.x;
        self.line_height = 0.0;
    }

    /// Place an inline box of `size`, wrapping first if it does not fit.
    fn place_inline(&mut self, size: Size) -> Point {
        if !self.at_line_start() && size.width > self.remaining() {
            self.break_line();
        }
        let at = Point::new(self.x, self.y);
        self.x += size.width;
        self.line_height = self.line_height.max(size.height);
        at
    }

    /// Height used so far, including an unfinished line.
    fn height(&self) -> f64 {
        self.y + self.line_height - self.origin.y
    }
}

fn parse_style(element: &ElementNode) -> HashMap<String, String> {
    element
        .attr("style")
        .unwrap_or_default()
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            Some((
                property.trim().to_ascii_lowercase(),
                value.trim().to_string(),
            ))
        })
        .collect()
}

/// Resolve a CSS length against `font_size` (for `em`) and `reference` (for `%`).
///
/// `NaN` and infinities are not CSS lengths and resolve to `None`.
fn parse_length(value: &str, font_size: f64, reference: f64) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let number = |s: &str| s.trim().parse::<f64>().ok().filter(|n| n.is_finite());
    if let Some(n) = value.strip_suffix("px") {
        number(n)
    } else if let Some(n) = value.strip_suffix("rem") {
        number(n).map(|n| n * ROOT_FONT_SIZE)
    } else if let Some(n) = value.strip_suffix("em") {
        number(n).map(|n| n * font_size)
    } else if let Some(n) = value.strip_suffix('%') {
        number(n).map(|n| n / 100.0 * reference)
    } else {
        number(&value)
    }
    .filter(|n| n.is_finite())
}

fn default_font_scale(tag: &str) -> f64 {
    match tag {
        "h1" => 2.0,
        "h2" => 1.5,
        "h3" => 1.17,
        "h5" => 0.83,
        "h6" => 0.67,
        _ => 1.0,
    }
}

fn is_inline(tag: &str) -> bool {
    matches!(tag, "span" | "strong" | "em" | "b" | "i" | "u" | "img" | "br")
}

/// Collapse runs of whitespace into single spaces.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH
}

/// Width of the content if nothing wrapped.
fn intrinsic_width(nodes: &[Node], font_size: f64) -> f64 {
    let mut widest: f64 = 0.0;
    let mut line: f64 = 0.0;
    for node in nodes {
        match node {
            Node::Text(t) => line += text_width(&collapse_whitespace(t), font_size),
            Node::Element(e) if e.tag == "br" => {
                widest = widest.max(line);
                line = 0.0;
            }
            Node::Element(e) => {
                let style = parse_style(e);
                let size = style
                    .get("font-size")
                    .and_then(|v| parse_length(v, font_size, font_size))
                    .unwrap_or(font_size * default_font_scale(&e.tag));
                let explicit = style
                    .get("width")
                    .and_then(|v| parse_length(v, size, 0.0))
                    .or_else(|| e.attr("width").and_then(|v| parse_length(v, size, 0.0)));
                let width = explicit.unwrap_or_else(|| intrinsic_width(&e.children, size));
                if is_inline(&e.tag) {
                    line += width;
                } else {
                    widest = widest.max(line).max(width);
                    line = 0.0;
                }
            }
        }
    }
    widest.max(line)
}

fn layout_nodes(
    nodes: &[Node],
    inherited: &Inherited,
    flow: &mut Flow,
    out: &mut Vec<MeasuredNode>,
) {
    for node in nodes {
        match node {
            Node::Text(text) => {
                let collapsed = collapse_whitespace(text);
                let text = if flow.at_line_start() {
                    collapsed.trim_start()
                } else {
                    collapsed.as_str()
                };
                if text.is_empty() {
                    continue;
                }
                let line_height = inherited.font_size * LINE_HEIGHT;
                let width = text_width(text, inherited.font_size);
                if width <= flow.remaining() || flow.width <= 0.0 {
                    flow.place_inline(Size::new(width, line_height));
                } else {
                    // Wrap across as many full lines as the text needs.
                    if !flow.at_line_start() {
                        flow.break_line();
                    }
                    let lines = (width / flow.width).ceil().max(1.0);
                    flow.y += (lines - 1.0) * line_height;
                    flow.place_inline(Size::new(width - (lines - 1.0) * flow.width, line_height));
                }
            }
            Node::Element(element) if element.tag == "br" => {
                let at = flow.place_inline(Size::new(0.0, inherited.font_size * LINE_HEIGHT));
                out.push(measured(element, Rect::from_origin_size(at, Size::ZERO), inherited));
                flow.break_line();
            }
            Node::Element(element) => layout_element(element, inherited, flow, out),
        }
    }
}

fn measured(element: &ElementNode, bounds: Rect, inherited: &Inherited) -> MeasuredNode {
    let kind = if element.tag == "img" {
        NodeKind::Image {
            src: element.attr("src").unwrap_or_default().to_string(),
            alt: element.attr("alt").map(str::to_string),
        }
    } else {
        NodeKind::Other {
            tag: element.tag.clone(),
        }
    };
    MeasuredNode {
        kind,
        bounds,
        has_element_children: element.has_element_children(),
        text: element.text_content(),
        color: Some(inherited.color),
        font_size: Some(inherited.font_size),
    }
}

fn layout_element(
    element: &ElementNode,
    parent: &Inherited,
    flow: &mut Flow,
    out: &mut Vec<MeasuredNode>,
) {
    let style = parse_style(element);
    let font_size = style
        .get("font-size")
        .and_then(|v| parse_length(v, parent.font_size, parent.font_size))
        .unwrap_or(parent.font_size * default_font_scale(&element.tag));
    let color = style
        .get("color")
        .and_then(|v| v.parse::<Color>().ok())
        .unwrap_or(parent.color);

    let position = style.get("position").map(|p| p.to_ascii_lowercase());
    let absolute = matches!(position.as_deref(), Some("absolute" | "fixed"));
    let relative = position.as_deref() == Some("relative");
    let inline = !absolute && is_inline(&element.tag);

    let length = |name: &str, reference: f64| {
        style
            .get(name)
            .and_then(|v| parse_length(v, font_size, reference))
    };
    let explicit_width = length("width", flow.width)
        .or_else(|| element.attr("width").and_then(|v| parse_length(v, font_size, 0.0)));
    let explicit_height = length("height", 0.0)
        .or_else(|| element.attr("height").and_then(|v| parse_length(v, font_size, 0.0)));
    let offset_x = length("left", flow.width).unwrap_or(0.0);
    let offset_y = length("top", 0.0).unwrap_or(0.0);

    let content_width = explicit_width.unwrap_or_else(|| {
        if absolute || inline {
            intrinsic_width(&element.children, font_size).min(flow.width.max(0.0))
        } else {
            flow.width
        }
    });

    // Block boxes start on a fresh line.
    if !absolute && !inline && !flow.at_line_start() {
        flow.break_line();
    }

    let static_origin = if absolute {
        Point::new(parent.containing.x + offset_x, parent.containing.y + offset_y)
    } else if inline {
        if !flow.at_line_start() && content_width > flow.remaining() {
            flow.break_line();
        }
        Point::new(flow.x, flow.y)
    } else {
        Point::new(flow.origin.x, flow.y)
    };
    let origin = if relative {
        static_origin + kurbo::Vec2::new(offset_x, offset_y)
    } else {
        static_origin
    };

    let inherited = Inherited {
        font_size,
        color,
        containing: if absolute || relative {
            origin
        } else {
            parent.containing
        },
    };

    // Reserve the slot so the parent precedes its descendants.
    let index = out.len();
    let mut inner = Flow::new(origin, content_width);
    if element.tag != "img" {
        layout_nodes(&element.children, &inherited, &mut inner, out);
    }
    let height = explicit_height.unwrap_or_else(|| inner.height().max(0.0));
    let size = Size::new(content_width, height);
    let bounds = Rect::from_origin_size(origin, size);
    out.insert(index, measured(element, bounds, &inherited));

    if absolute {
        return;
    }
    if inline {
        flow.place_inline(size);
    } else {
        flow.y = static_origin.y + height;
        flow.x = flow.origin.x;
        flow.line_height = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::sanitize::sanitize_html;

    fn measure(markup: &str) -> Vec<MeasuredNode> {
        StaticLayout::default().measure(&sanitize_html(markup))
    }

    #[test]
    fn test_absolute_positioning() {
        let nodes = measure(
            r#"<div><div style="position: absolute; left: 40px; top: 100px; font-size: 20px; color: #444">Sub</div></div>"#,
        );
        assert_eq!(nodes.len(), 2);
        let sub = &nodes[1];
        assert_eq!(sub.bounds.origin(), Point::new(40.0, 100.0));
        assert_eq!(sub.font_size, Some(20.0));
        assert_eq!(sub.color, Some(Color::rgb(68, 68, 68)));
        assert_eq!(sub.text, "Sub");
        assert!(!sub.has_element_children);
        assert!(nodes[0].has_element_children);
    }

    #[test]
    fn test_image_size_from_attributes() {
        let nodes = measure(
            r#"<div style="position: absolute; left: 420px; top: 60px; width: 240px; height: 240px;"><img src="a.png" alt="A" width="240" height="240"></div>"#,
        );
        let image = &nodes[1];
        assert_eq!(
            image.kind,
            NodeKind::Image {
                src: "a.png".to_string(),
                alt: Some("A".to_string())
            }
        );
        assert_eq!(image.bounds, Rect::new(420.0, 60.0, 660.0, 300.0));
    }

    #[test]
    fn test_blocks_stack_vertically() {
        let nodes = measure("<h1>Title</h1><p>Body</p>");
        assert_eq!(nodes[0].font_size, Some(32.0));
        assert_eq!(nodes[0].bounds.origin(), Point::ZERO);
        assert!((nodes[1].bounds.y0 - 32.0 * LINE_HEIGHT).abs() < 1e-9);
        assert_eq!(nodes[1].bounds.width(), 720.0);
        assert_eq!(nodes[1].color, Some(Color::black()));
    }

    #[test]
    fn test_inline_elements_flow() {
        let nodes = measure("<p>Big <strong>sale</strong></p>");
        let strong = &nodes[1];
        // "Big " is 4 glyphs at 8px each.
        assert_eq!(strong.bounds.x0, 32.0);
        assert_eq!(strong.bounds.y0, 0.0);
        assert_eq!(strong.bounds.width(), 32.0);
    }

    #[test]
    fn test_relative_parent_is_containing_block() {
        let nodes = measure(
            r#"<div style="position: relative; left: 10px; top: 10px"><span style="position: absolute; left: 5px; top: 5px">x</span></div>"#,
        );
        assert_eq!(nodes[1].bounds.origin(), Point::new(15.0, 15.0));
    }

    #[test]
    fn test_closure_measurer() {
        let fixed = |_: &Fragment| -> Vec<MeasuredNode> { Vec::new() };
        assert!(fixed.measure(&Fragment::default()).is_empty());
    }
}
