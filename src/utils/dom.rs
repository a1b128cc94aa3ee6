// src/utils/dom.rs

//! Selector lookups shared by all entity accessors.
//!
//! Every helper treats a selector miss as "field absent". A selector that
//! fails to parse is logged and treated the same way.

use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};

/// Parse a CSS selector.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn selector_or_log(s: &str) -> Option<Selector> {
    match parse_selector(s) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::error!("{e}");
            None
        }
    }
}

/// All elements of a document matching `selector`, in document order.
pub fn select_all<'a>(document: &'a Html, selector: &str) -> Vec<ElementRef<'a>> {
    match selector_or_log(selector) {
        Some(sel) => document.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// First element of a document matching `selector`.
pub fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = selector_or_log(selector)?;
    document.select(&sel).next()
}

/// First descendant of `element` matching `selector`.
pub fn find_first<'a>(element: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let sel = selector_or_log(selector)?;
    element.select(&sel).next()
}

/// Text content of an element.
pub fn text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of the first match, empty on a miss.
pub fn first_text(document: &Html, selector: &str) -> String {
    select_first(document, selector)
        .map(text)
        .unwrap_or_default()
}

/// Concatenated text of every match, empty on a miss.
pub fn all_text(document: &Html, selector: &str) -> String {
    select_all(document, selector).into_iter().map(text).collect()
}

/// Attribute of the first match.
pub fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    select_first(document, selector)
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

/// Attribute of an element, empty when missing.
pub fn attr(element: ElementRef<'_>, name: &str) -> String {
    element.value().attr(name).unwrap_or_default().to_string()
}

/// Whether the element carries the given class.
pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}
