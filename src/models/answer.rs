// src/models/answer.rs

use std::fmt;
use std::path::{Path, PathBuf};

use ::url::form_urlencoded;

use crate::error::Result;
use crate::models::{Field, FieldValue, Page, Question, User};
use crate::services::{Limit, export, listings};
use crate::session::Session;
use crate::utils::{self, dom, fs, url};

/// An answer page.
///
/// The owning question and the author are usually known by whoever lists
/// the answer; otherwise they are read from the page.
#[derive(Debug, Clone)]
pub struct Answer {
    page: Page,
    question: Option<Question>,
    author: Option<User>,
}

impl Answer {
    pub fn new(
        session: &Session,
        link: impl Into<String>,
        question: Option<Question>,
        author: Option<User>,
    ) -> Self {
        Self {
            page: Page::new(session.clone(), link),
            question,
            author,
        }
    }

    pub fn link(&self) -> &str {
        self.page.link()
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.page.refresh()
    }

    pub(crate) fn seed(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.page.seed(field, value);
    }

    /// The question if already known, without touching the network.
    pub fn cached_question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn id(&mut self) -> i64 {
        self.page.cached_int(Field::AnswerId, |doc| {
            dom::first_attr(doc, "div.zm-item-answer.zm-item-expanded", "data-aid")
                .and_then(|id| id.trim().parse().ok())
                .unwrap_or(0)
        })
    }

    pub fn question(&mut self) -> Option<Question> {
        if self.question.is_none() {
            let session = self.page.session().clone();
            let doc = self.page.document()?;
            let href = dom::first_attr(doc, "h2.zm-item-title>a", "href")?;
            let title = utils::strip(&dom::first_text(doc, "h2.zm-item-title")).to_string();
            match Question::new(&session, url::make_link(&href), title) {
                Ok(question) => self.question = Some(question),
                Err(e) => {
                    log::warn!("Answer {} has no usable question: {e}", self.link());
                    return None;
                }
            }
        }
        self.question.clone()
    }

    pub fn author(&mut self) -> Option<User> {
        if self.author.is_none() {
            let session = self.page.session().clone();
            let doc = self.page.document()?;
            let info = dom::select_first(doc, "div.zm-item-answer-author-info");
            self.author = Some(listings::author_from_info(&session, info));
        }
        self.author.clone()
    }

    pub fn upvote(&mut self) -> i64 {
        self.page.cached_int(Field::Upvote, |doc| {
            utils::parse_count(utils::strip(&dom::first_text(doc, "span.count")))
        })
    }

    /// Answer body as a standalone HTML document.
    pub fn content(&mut self) -> String {
        self.page.cached_text(Field::Content, |doc| {
            dom::select_first(doc, "div#zh-question-answer-wrap div.zm-editable-content")
                .map(export::answer_html)
                .unwrap_or_default()
        })
    }

    pub fn comments_num(&mut self) -> i64 {
        self.page.cached_int(Field::CommentsNum, |doc| {
            utils::first_int(utils::strip(&dom::first_text(doc, "a.meta-item.toggle-comment")))
        })
    }

    pub fn collected_num(&mut self) -> i64 {
        self.page.cached_int(Field::CollectedNum, |doc| {
            utils::strip(&dom::first_text(
                doc,
                r#"a[data-za-l="sidebar_answer_collected_count"]"#,
            ))
            .trim()
            .parse()
            .unwrap_or(0)
        })
    }

    /// Users who voted the answer up, in the order the site lists them.
    pub fn voters_n(&mut self, limit: impl Into<Limit>) -> Vec<User> {
        let limit = limit.into();
        if limit.is_zero() {
            return Vec::new();
        }
        let id = self.id();
        if id == 0 {
            log::warn!("No answer id on {}, cannot list voters", self.link());
            return Vec::new();
        }

        let params = format!(r#"{{"answer_id":"{id}"}}"#);
        let link = format!(
            "{}?params={}",
            url::make_link("/node/AnswerFullVoteInfoV2"),
            form_urlencoded::byte_serialize(params.as_bytes()).collect::<String>()
        );
        let session = self.page.session().clone();
        let doc = match session.document(&link) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!("Failed to load voters of {}: {e}", self.link());
                return Vec::new();
            }
        };

        let mut voters = Vec::new();
        for span in dom::select_all(&doc, ".voters span") {
            if limit.is_met(voters.len()) {
                break;
            }
            let name = dom::text(span);
            let name = utils::strip(&name).trim_matches('、');
            let href = dom::find_first(span, "a")
                .map(|a| dom::attr(a, "href"))
                .unwrap_or_default();
            voters.push(listings::user_from_link(&session, name, &href));
        }
        voters
    }

    pub fn voters(&mut self) -> Vec<User> {
        self.voters_n(Limit::All)
    }

    /// Write the answer body to `<path>.html`.
    pub fn export_html(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let content = self.content();
        fs::save_html(path.as_ref(), &content)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.author {
            Some(author) => write!(f, "<Answer: {} - {}>", author, self.link()),
            None => write!(f, "<Answer: {}>", self.link()),
        }
    }
}
