//! Allow-list HTML sanitizer.
//!
//! Untrusted markup is tokenized with `quick-xml` in a lenient mode and
//! rebuilt as a small tree that only contains allowed tags and attributes.
//! Disallowed tags are unwrapped (their children are kept), except for tags
//! whose content is never meant to be displayed, which are dropped whole.

use html_escape::{decode_html_entities, encode_double_quoted_attribute, encode_text};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

pub const ALLOWED_TAGS: &[&str] = &[
    "div", "span", "p", "h1", "h2", "h3", "h4", "h5", "h6", "img", "strong", "em", "b", "i", "u",
    "br",
];

pub const ALLOWED_ATTRIBUTES: &[&str] = &["style", "src", "alt", "width", "height"];

/// Tags removed together with everything inside them.
pub const RAW_CONTENT_TAGS: &[&str] = &[
    "script", "style", "template", "noscript", "iframe", "object", "textarea", "title",
];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// URI schemes accepted in `src`.
const SAFE_SCHEMES: &[&str] = &["http", "https", "blob"];

/// A node of sanitized markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Text(String),
}

/// An allowed element with its allowed attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    /// Lowercase tag name.
    pub tag: String,
    /// Lowercase attribute names with decoded values.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_void(&self) -> bool {
        VOID_TAGS.contains(&self.tag.as_str())
    }

    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|c| matches!(c, Node::Element(_)))
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        collect_text(&self.children, &mut text);
        text
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(&e.children, out),
        }
    }
}

/// Sanitized markup: a forest of allowed nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize back to markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(node, &mut out);
        }
        out
    }

    /// All elements in document (pre-)order.
    pub fn elements(&self) -> Vec<&ElementNode> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a ElementNode>) {
            for node in nodes {
                if let Node::Element(e) = node {
                    out.push(e);
                    walk(&e.children, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&encode_text(text)),
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');
            if element.is_void() {
                return;
            }
            for child in &element.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

/// Check whether a `src` value may be kept.
///
/// Accepts http(s), blob and `data:image/...` URIs plus relative references.
pub fn is_safe_uri(value: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes.
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    let scheme_end = compact.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if compact[i..].starts_with(':') => {
            let scheme = &compact[..i];
            SAFE_SCHEMES.contains(&scheme) || (scheme == "data" && compact.starts_with("data:image/"))
        }
        _ => true,
    }
}

/// Check whether an inline `style` value may be kept.
pub fn is_safe_style(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    !compact.contains("expression(") && !compact.contains("javascript:")
}

fn keep_attribute(name: &str, value: &str) -> bool {
    if !ALLOWED_ATTRIBUTES.contains(&name) {
        return false;
    }
    match name {
        "src" => is_safe_uri(value),
        "style" => is_safe_style(value),
        _ => true,
    }
}

/// Sanitize untrusted markup.
///
/// Never fails: markup the tokenizer cannot recover from is truncated at the
/// offending token and a warning is logged.
pub fn sanitize_html(raw: &str) -> Fragment {
    let prepared = escape_stray_markup(&strip_raw_content(raw));
    let mut builder = TreeBuilder::default();

    let mut reader = Reader::from_str(&prepared);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let tag = tag_name(&e);
                builder.open(tag, || allowed_attributes(&e));
            }
            Ok(Event::Empty(e)) => {
                let tag = tag_name(&e);
                builder.leaf(tag, || allowed_attributes(&e));
            }
            Ok(Event::End(e)) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase();
                builder.close(&tag);
            }
            Ok(Event::Text(t)) => {
                let text = String::from_utf8_lossy(&t);
                builder.text(&decode_html_entities(&text));
            }
            Ok(Event::GeneralRef(r)) => {
                let reference = format!("&{};", String::from_utf8_lossy(&r));
                builder.text(&decode_html_entities(&reference));
            }
            Ok(Event::CData(c)) => {
                builder.text(&String::from_utf8_lossy(&c));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                log::warn!(
                    "Truncating malformed markup at byte {}: {}",
                    reader.error_position(),
                    e
                );
                break;
            }
        }
    }

    builder.finish()
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_ascii_lowercase()
}

fn allowed_attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = Vec::new();
    for attr in e.html_attributes().flatten() {
        let name = String::from_utf8_lossy(attr.key.as_ref()).to_ascii_lowercase();
        if attributes.iter().any(|(k, _)| *k == name) {
            continue;
        }
        let raw_value = String::from_utf8_lossy(&attr.value);
        let value = decode_html_entities(&raw_value).into_owned();
        if keep_attribute(&name, &value) {
            attributes.push((name, value));
        }
    }
    attributes
}

/// An element whose end tag has not been seen yet.
enum Open {
    Kept(ElementNode),
    /// Disallowed element whose children go to the nearest kept ancestor.
    Unwrapped(String),
}

impl Open {
    fn tag(&self) -> &str {
        match self {
            Open::Kept(e) => &e.tag,
            Open::Unwrapped(tag) => tag,
        }
    }
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<Node>,
    open: Vec<Open>,
    /// Raw-content element being skipped, with its nesting depth.
    skipping: Option<(String, usize)>,
}

impl TreeBuilder {
    fn open(&mut self, tag: String, attributes: impl FnOnce() -> Vec<(String, String)>) {
        if let Some((skipped, depth)) = &mut self.skipping {
            if *skipped == tag {
                *depth += 1;
            }
            return;
        }
        if RAW_CONTENT_TAGS.contains(&tag.as_str()) {
            self.skipping = Some((tag, 1));
            return;
        }
        if VOID_TAGS.contains(&tag.as_str()) {
            self.leaf(tag, attributes);
            return;
        }
        if ALLOWED_TAGS.contains(&tag.as_str()) {
            let mut element = ElementNode::new(tag);
            element.attributes = attributes();
            self.open.push(Open::Kept(element));
        } else {
            self.open.push(Open::Unwrapped(tag));
        }
    }

    fn leaf(&mut self, tag: String, attributes: impl FnOnce() -> Vec<(String, String)>) {
        if self.skipping.is_some() || !ALLOWED_TAGS.contains(&tag.as_str()) {
            return;
        }
        let mut element = ElementNode::new(tag);
        element.attributes = attributes();
        self.append(Node::Element(element));
    }

    fn close(&mut self, tag: &str) {
        if let Some((skipped, depth)) = &mut self.skipping {
            if skipped == tag {
                *depth -= 1;
                if *depth == 0 {
                    self.skipping = None;
                }
            }
            return;
        }
        if VOID_TAGS.contains(&tag) {
            return;
        }
        let Some(index) = self.open.iter().rposition(|o| o.tag() == tag) else {
            return;
        };
        while self.open.len() > index {
            self.pop();
        }
    }

    fn text(&mut self, text: &str) {
        if self.skipping.is_some() || text.is_empty() {
            return;
        }
        let siblings = self.current_children();
        if let Some(Node::Text(previous)) = siblings.last_mut() {
            previous.push_str(text);
        } else {
            siblings.push(Node::Text(text.to_string()));
        }
    }

    fn current_children(&mut self) -> &mut Vec<Node> {
        for open in self.open.iter_mut().rev() {
            if let Open::Kept(element) = open {
                return &mut element.children;
            }
        }
        &mut self.roots
    }

    fn append(&mut self, node: Node) {
        self.current_children().push(node);
    }

    fn pop(&mut self) {
        if let Some(Open::Kept(element)) = self.open.pop() {
            self.append(Node::Element(element));
        }
    }

    fn finish(mut self) -> Fragment {
        while !self.open.is_empty() {
            self.pop();
        }
        Fragment { nodes: self.roots }
    }
}

/// Drop raw-content elements and doctype declarations before tokenizing,
/// since their content is not markup.
fn strip_raw_content(raw: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `raw`.
    let lower = raw.to_ascii_lowercase();
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;

    while let Some(rel) = lower[pos..].find('<') {
        let start = pos + rel;
        let after = &lower[start + 1..];

        if after.starts_with("!doctype") {
            out.push_str(&raw[pos..start]);
            pos = match lower[start..].find('>') {
                Some(end) => start + end + 1,
                None => raw.len(),
            };
            continue;
        }

        let raw_tag = RAW_CONTENT_TAGS.iter().find(|tag| {
            after.starts_with(**tag)
                && after[tag.len()..]
                    .chars()
                    .next()
                    .is_none_or(|c| c.is_ascii_whitespace() || c == '>' || c == '/')
        });

        match raw_tag {
            Some(tag) => {
                out.push_str(&raw[pos..start]);
                let closing = format!("</{}", tag);
                pos = lower[start..]
                    .find(&closing)
                    .and_then(|c| {
                        let close_start = start + c;
                        lower[close_start..].find('>').map(|g| close_start + g + 1)
                    })
                    .unwrap_or(raw.len());
            }
            None => {
                out.push_str(&raw[pos..=start]);
                pos = start + 1;
            }
        }
    }
    out.push_str(&raw[pos..]);
    out
}

/// Escape `&` and `<` that do not begin a reference or a tag, the way an
/// HTML parser would read them as text.
fn escape_stray_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (i, c) in input.char_indices() {
        match c {
            '&' if !starts_reference(&input[i + 1..]) => out.push_str("&amp;"),
            '<' if !starts_tag(&input[i + 1..]) => out.push_str("&lt;"),
            _ => out.push(c),
        }
    }
    out
}

fn starts_reference(rest: &str) -> bool {
    let Some(end) = rest.find(';') else {
        return false;
    };
    let body = &rest[..end];
    if body.is_empty() || body.len() > 32 {
        return false;
    }
    if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
        !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit())
    } else if let Some(dec) = body.strip_prefix('#') {
        !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit())
    } else {
        body.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

fn starts_tag(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}
