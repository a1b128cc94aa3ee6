// src/session.rs

//! Session handle shared by every entity.
//!
//! A [`Session`] wraps the transport ([`Fetcher`]) together with the paging
//! settings. Entities created from one another share the same handle, so a
//! test can swap the whole network for a fake in one place.

use std::fmt;
use std::rc::Rc;

use scraper::Html;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{Config, PagingConfig};
use crate::utils::http::HttpFetcher;

/// Transport used to reach the site.
pub trait Fetcher {
    /// GET a page and return its body.
    fn get(&self, url: &str) -> Result<String>;

    /// POST a form-encoded body as an XHR and return the response body.
    fn post_form(&self, url: &str, form: &[(String, String)], referer: &str) -> Result<String>;
}

/// Position of the item count and HTML in an AJAX envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeLayout {
    /// `{"msg": [itemCount, htmlFragment]}`
    CountThenFragment,
    /// `{"msg": [fragment, fragment, ...]}`, one fragment per item
    FragmentList,
}

/// How the offset is carried in the form body.
#[derive(Debug, Clone)]
pub enum AjaxQuery {
    /// `_xsrf` and `offset` form fields
    Offset,
    /// `_xsrf`, `method=next` and a `params` JSON object; the offset is
    /// written into the object
    NodeParams(Map<String, Value>),
}

/// A fixed AJAX listing endpoint.
#[derive(Debug, Clone)]
pub struct AjaxEndpoint {
    pub url: String,
    pub referer: String,
    pub query: AjaxQuery,
    pub layout: EnvelopeLayout,
    /// Items in a full batch; a shorter batch is the last one
    pub page_size: usize,
}

impl AjaxEndpoint {
    /// Form body requesting the batch that starts at `offset`.
    pub fn form(&self, xsrf: &str, offset: usize) -> Vec<(String, String)> {
        let mut form = vec![("_xsrf".to_string(), xsrf.to_string())];
        match &self.query {
            AjaxQuery::Offset => {
                form.push(("offset".to_string(), offset.to_string()));
            }
            AjaxQuery::NodeParams(params) => {
                let mut params = params.clone();
                params.insert("offset".to_string(), Value::from(offset));
                form.push(("method".to_string(), "next".to_string()));
                form.push(("params".to_string(), Value::Object(params).to_string()));
            }
        }
        form
    }
}

/// One decoded AJAX batch.
#[derive(Debug)]
pub struct AjaxBatch {
    pub document: Html,
    /// Number of items the endpoint reported for this batch
    pub returned: usize,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    r: i64,
    #[serde(default)]
    msg: Value,
}

/// Decode an envelope body according to the endpoint's layout.
pub fn decode_envelope(body: &str, endpoint: &str, layout: EnvelopeLayout) -> Result<AjaxBatch> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.r != 0 {
        return Err(AppError::ajax(endpoint, format!("r = {}", envelope.r)));
    }
    let msg = envelope
        .msg
        .as_array()
        .ok_or_else(|| AppError::ajax(endpoint, "msg is not an array"))?;

    match layout {
        EnvelopeLayout::CountThenFragment => {
            let returned = msg
                .first()
                .and_then(Value::as_f64)
                .ok_or_else(|| AppError::ajax(endpoint, "msg[0] is not an item count"))?;
            let fragment = msg
                .get(1)
                .and_then(Value::as_str)
                .ok_or_else(|| AppError::ajax(endpoint, "msg[1] is not an HTML fragment"))?;
            Ok(AjaxBatch {
                document: Html::parse_fragment(fragment),
                returned: returned.max(0.0) as usize,
            })
        }
        EnvelopeLayout::FragmentList => {
            let mut html = String::new();
            for item in msg {
                let fragment = item
                    .as_str()
                    .ok_or_else(|| AppError::ajax(endpoint, "msg holds a non-string item"))?;
                html.push_str(fragment);
            }
            Ok(AjaxBatch {
                document: Html::parse_fragment(&html),
                returned: msg.len(),
            })
        }
    }
}

/// Cloneable handle to the transport and paging settings.
#[derive(Clone)]
pub struct Session {
    fetcher: Rc<dyn Fetcher>,
    paging: PagingConfig,
}

impl Session {
    pub fn new(fetcher: Rc<dyn Fetcher>, paging: PagingConfig) -> Self {
        Self { fetcher, paging }
    }

    /// Build an HTTP-backed session from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self::new(Rc::new(fetcher), config.paging.clone()))
    }

    pub fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    /// GET a page and parse it.
    pub fn document(&self, url: &str) -> Result<Html> {
        let body = self.fetcher.get(url)?;
        Ok(Html::parse_document(&body))
    }

    /// POST the batch starting at `offset` and decode the envelope.
    pub fn ajax(&self, endpoint: &AjaxEndpoint, xsrf: &str, offset: usize) -> Result<AjaxBatch> {
        let form = endpoint.form(xsrf, offset);
        let body = self
            .fetcher
            .post_form(&endpoint.url, &form, &endpoint.referer)?;
        decode_envelope(&body, &endpoint.url, endpoint.layout)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("paging", &self.paging)
            .finish_non_exhaustive()
    }
}
