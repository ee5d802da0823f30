//! Standalone HTML export.

use crate::document::Document;
use crate::element::{Element, px};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write as _;

/// File name offered for downloads.
pub const EXPORT_FILENAME: &str = "poster.html";
pub const EXPORT_MIME_TYPE: &str = "text/html; charset=utf-8";

const GENERATOR: &str = "HTML Poster Editor";

fn stage_css(canvas_size: f64) -> String {
    format!(
        "*{{box-sizing:border-box}}body{{margin:0}}#stage{{position:relative;width:{size};height:{size};overflow:hidden;border:1px solid #e5e7eb}}",
        size = px(canvas_size)
    )
}

/// A generated file ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: &'static str,
    pub mime_type: &'static str,
    pub contents: String,
}

impl ExportedFile {
    pub fn html(contents: String) -> Self {
        Self {
            filename: EXPORT_FILENAME,
            mime_type: EXPORT_MIME_TYPE,
            contents,
        }
    }
}

/// Inline style of an element's positioned wrapper.
fn wrapper_style(element: &Element) -> String {
    let position = element.position();
    let mut decls = vec![
        ("position", "absolute".to_string()),
        ("left", px(position.x)),
        ("top", px(position.y)),
    ];
    if let Some(width) = element.width() {
        decls.push(("width", px(width)));
    }
    if let Some(height) = element.height() {
        decls.push(("height", px(height)));
    }
    decls.extend(element.styles().css_declarations());

    decls
        .iter()
        .map(|(property, value)| format!("{}: {};", property, value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_element(out: &mut String, element: &Element) {
    let style = wrapper_style(element);
    let _ = write!(
        out,
        "<div style=\"{}\">",
        encode_double_quoted_attribute(&style)
    );
    match element {
        Element::Text(text) => out.push_str(&encode_text(&text.content)),
        Element::Image(image) => {
            let _ = write!(
                out,
                "<img src=\"{}\"",
                encode_double_quoted_attribute(&image.src)
            );
            if let Some(alt) = image.alt.as_deref().filter(|a| !a.is_empty()) {
                let _ = write!(out, " alt=\"{}\"", encode_double_quoted_attribute(alt));
            }
            if let Some(width) = image.width {
                let _ = write!(out, " width=\"{}\"", width);
            }
            if let Some(height) = image.height {
                let _ = write!(out, " height=\"{}\"", height);
            }
            out.push_str(" style=\"display: block;\">");
        }
    }
    out.push_str("</div>");
}

/// Serialize `document` as a standalone HTML page on a canvas of
/// `canvas_size` pixels.
pub fn export_html(document: &Document, canvas_size: f64) -> String {
    let mut out = String::from("<!DOCTYPE html>\n");
    out.push_str("<html>\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<title>Poster</title>\n");
    let _ = writeln!(out, "<meta name=\"generator\" content=\"{}\">", GENERATOR);
    let _ = writeln!(out, "<style>{}</style>", stage_css(canvas_size));
    out.push_str("</head>\n<body>\n<div id=\"stage\">\n");
    for element in document.iter() {
        write_element(&mut out, element);
        out.push('\n');
    }
    out.push_str("</div>\n</body>\n</html>\n");

    log::info!("Exported {} elements to HTML", document.len());
    out
}
