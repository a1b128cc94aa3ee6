//! In-memory transport for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::error::{AppError, Result};
use crate::models::PagingConfig;
use crate::session::{Fetcher, Session};

/// A request seen by [`FakeFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Get(String),
    Post {
        url: String,
        form: Vec<(String, String)>,
    },
}

impl Request {
    /// Value of a form field of a POST.
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            Request::Get(_) => None,
            Request::Post { form, .. } => form
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
        }
    }
}

/// Serves canned pages and queued AJAX bodies; records every request.
#[derive(Default)]
pub struct FakeFetcher {
    pages: RefCell<HashMap<String, String>>,
    ajax: RefCell<HashMap<String, VecDeque<String>>>,
    requests: RefCell<Vec<Request>>,
}

impl FakeFetcher {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Serve `body` for GET `url`, replacing any earlier body.
    pub fn page(&self, url: &str, body: impl Into<String>) {
        self.pages.borrow_mut().insert(url.to_string(), body.into());
    }

    /// Queue `body` as the next answer to a POST to `url`.
    pub fn ajax(&self, url: &str, body: impl Into<String>) {
        self.ajax
            .borrow_mut()
            .entry(url.to_string())
            .or_default()
            .push_back(body.into());
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Get(url) => Some(url),
                Request::Post { .. } => None,
            })
            .collect()
    }

    pub fn posts(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| matches!(r, Request::Post { .. }))
            .collect()
    }
}

impl Fetcher for FakeFetcher {
    fn get(&self, url: &str) -> Result<String> {
        self.requests.borrow_mut().push(Request::Get(url.to_string()));
        self.pages
            .borrow()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::validation(format!("no page for {url}")))
    }

    fn post_form(&self, url: &str, form: &[(String, String)], _referer: &str) -> Result<String> {
        self.requests.borrow_mut().push(Request::Post {
            url: url.to_string(),
            form: form.to_vec(),
        });
        self.ajax
            .borrow_mut()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| AppError::validation(format!("no AJAX response for {url}")))
    }
}

/// Session over a fake with the given page sizes.
pub fn session_with(fake: &Rc<FakeFetcher>, page_size: usize) -> Session {
    let paging = PagingConfig {
        page_size,
        answer_page_size: page_size,
        collection_page_size: page_size,
    };
    Session::new(fake.clone(), paging)
}

/// Session over a fake with the default page sizes.
pub fn session(fake: &Rc<FakeFetcher>) -> Session {
    Session::new(fake.clone(), PagingConfig::default())
}

/// JSON body of a `[count, html]` envelope.
pub fn counted_envelope(count: usize, html: &str) -> String {
    serde_json::json!({ "r": 0, "msg": [count, html] }).to_string()
}

/// JSON body of a `[fragment, ...]` envelope.
pub fn list_envelope(fragments: &[String]) -> String {
    serde_json::json!({ "r": 0, "msg": fragments }).to_string()
}

/// Markup of a follower card.
pub fn profile_card(name: &str) -> String {
    format!(
        r#"<div class="zm-profile-card"><h2 class="zm-list-content-title"><a class="zg-link" href="/people/{name}" title="{name}">{name}</a></h2></div>"#
    )
}
