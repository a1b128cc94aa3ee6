//! Lazily fetched page shared by every entity.

use scraper::Html;

use crate::error::Result;
use crate::models::fields::{Field, FieldCache, FieldValue};
use crate::session::Session;
use crate::utils::dom;

/// A remote page: its link, the parsed document once fetched, and the
/// fields memoized from that document.
#[derive(Debug, Clone)]
pub struct Page {
    link: String,
    session: Session,
    document: Option<Html>,
    fields: FieldCache,
}

impl Page {
    pub fn new(session: Session, link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            session,
            document: None,
            fields: FieldCache::new(),
        }
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The page document, fetched on first use.
    ///
    /// A failed fetch is logged and yields `None`; the next call retries.
    pub fn document(&mut self) -> Option<&Html> {
        if self.document.is_none() {
            match self.session.document(&self.link) {
                Ok(document) => self.document = Some(document),
                Err(e) => {
                    log::error!("Failed to fetch {}: {}", self.link, e);
                    return None;
                }
            }
        }
        self.document.as_ref()
    }

    /// Drop every memoized field and fetch the document again.
    pub fn refresh(&mut self) -> Result<()> {
        self.fields.clear();
        self.document = None;
        let document = self.session.document(&self.link)?;
        self.document = Some(document);
        Ok(())
    }

    pub fn fields(&self) -> &FieldCache {
        &self.fields
    }

    /// Pre-fill a field, typically from a listing that already showed it.
    pub fn seed(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.fields.set(field, value);
    }

    /// Memoized integer field; 0 when the document is unavailable.
    pub fn cached_int(&mut self, field: Field, extract: impl FnOnce(&Html) -> i64) -> i64 {
        if let Some(value) = self.fields.int(field) {
            return value;
        }
        let Some(value) = self.document().map(extract) else {
            return 0;
        };
        self.fields.set(field, value);
        value
    }

    /// Memoized text field; empty when the document is unavailable.
    pub fn cached_text(&mut self, field: Field, extract: impl FnOnce(&Html) -> String) -> String {
        if let Some(value) = self.fields.text(field) {
            return value.to_string();
        }
        let Some(value) = self.document().map(extract) else {
            return String::new();
        };
        self.fields.set(field, value.clone());
        value
    }

    /// Anti-forgery token replayed in AJAX forms.
    pub fn xsrf(&mut self) -> String {
        self.cached_text(Field::Xsrf, |doc| {
            dom::first_attr(doc, r#"input[name="_xsrf"]"#, "value").unwrap_or_default()
        })
    }

    /// A copy carrying the link and memoized fields but no document.
    pub fn detached(&self) -> Self {
        Self {
            link: self.link.clone(),
            session: self.session.clone(),
            document: None,
            fields: self.fields.clone(),
        }
    }
}
