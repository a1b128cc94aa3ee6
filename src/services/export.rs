// src/services/export.rs

//! Standalone HTML rendering of answer bodies.
//!
//! The answer body is serialized from the parsed tree with a few rewrites so
//! the file reads well offline: lazy images get a real `src`, redirect links
//! point at their target and editor-only widgets are dropped.

use scraper::{ElementRef, Node};

use crate::utils::{dom, url};

const DOCUMENT_HEAD: &str = r#"<html><head><meta charset="utf-8"></head><body>"#;
const DOCUMENT_TAIL: &str = "</body></html>";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Render an answer body as a complete UTF-8 HTML document.
pub fn answer_html(content: ElementRef<'_>) -> String {
    let mut out = String::from(DOCUMENT_HEAD);
    write_element(content, true, &mut out);
    out.push_str(DOCUMENT_TAIL);
    out
}

fn is_dropped(element: ElementRef<'_>) -> bool {
    let value = element.value();
    match value.name() {
        "noscript" => true,
        "i" => dom::has_class(element, "icon-external"),
        "a" => dom::has_class(element, "zu-edit-button"),
        _ => false,
    }
}

fn has_next_element(element: ElementRef<'_>) -> bool {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .any(|sibling| !is_dropped(sibling))
}

fn image_source(element: ElementRef<'_>) -> String {
    let key = if dom::has_class(element, "origin_image") {
        "data-original"
    } else {
        "data-actualsrc"
    };
    dom::attr(element, key)
}

fn write_element(element: ElementRef<'_>, is_root: bool, out: &mut String) {
    if is_dropped(element) {
        return;
    }
    let name = element.value().name();

    let mut attrs: Vec<(String, String)> = element
        .value()
        .attrs()
        .filter(|(key, _)| !(is_root && *key == "class"))
        .filter(|(key, _)| !(name == "img" && *key == "src"))
        .map(|(key, value)| {
            let value = match (name, key) {
                ("a", "href") => url::redirect_target(value).unwrap_or_else(|| value.to_string()),
                _ => value.to_string(),
            };
            (key.to_string(), value)
        })
        .collect();
    if name == "img" {
        attrs.push(("src".to_string(), image_source(element)));
    }
    attrs.sort();

    out.push('<');
    out.push_str(name);
    for (key, value) in &attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(value, true));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        if name == "img" && !has_next_element(element) {
            out.push_str("<br>");
        }
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&escape(text, false)),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    write_element(child, false, out);
                }
            }
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape(text: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' if !in_attribute => escaped.push_str("&lt;"),
            '>' if !in_attribute => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
