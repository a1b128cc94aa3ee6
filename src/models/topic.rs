// src/models/topic.rs

use std::fmt;

use crate::error::{AppError, Result};
use crate::models::{Field, Page, User};
use crate::services::listings;
use crate::session::Session;
use crate::utils::{self, dom, url};

/// A topic page.
#[derive(Debug, Clone)]
pub struct Topic {
    page: Page,
    name: String,
}

impl Topic {
    pub fn new(session: &Session, link: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let link = link.into();
        if !url::is_topic_link(&link) {
            return Err(AppError::invalid_link("topic", link));
        }
        Ok(Self {
            page: Page::new(session.clone(), link),
            name: name.into(),
        })
    }

    pub fn link(&self) -> &str {
        self.page.link()
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.page.refresh()
    }

    pub fn name(&mut self) -> String {
        if self.name.is_empty() {
            if let Some(doc) = self.page.document() {
                self.name = utils::strip(&dom::first_text(doc, "h1.zm-editable-content")).to_string();
            }
        }
        self.name.clone()
    }

    pub fn description(&mut self) -> String {
        self.page.cached_text(Field::Description, |doc| {
            utils::strip(&dom::first_text(doc, "div.zm-editable-content")).to_string()
        })
    }

    pub fn followers_num(&mut self) -> i64 {
        self.page.cached_int(Field::FollowersNum, |doc| {
            utils::strip(&dom::first_text(doc, "div.zm-topic-side-followers-info strong"))
                .trim()
                .parse()
                .unwrap_or(0)
        })
    }

    /// Best answerers listed on the side bar, usually five. Each carries the
    /// bio shown next to it.
    pub fn top_authors(&mut self) -> Vec<User> {
        let session = self.page.session().clone();
        let Some(doc) = self.page.document() else {
            return Vec::new();
        };
        let selector = "div#zh-topic-top-answerer div.zm-topic-side-person-item-content";
        dom::select_all(doc, selector)
            .into_iter()
            .map(|item| {
                let (name, href) = dom::find_first(item, "a")
                    .map(|a| (dom::text(a), dom::attr(a, "href")))
                    .unwrap_or_default();
                let mut author = listings::user_from_link(&session, &name, &href);
                if let Some(bio) = dom::find_first(item, "div.zm-topic-side-bio") {
                    author.seed(Field::Bio, dom::attr(bio, "title"));
                }
                author
            })
            .collect()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Topic: {} - {}>", self.name, self.link())
    }
}
