// src/models/collection.rs

use std::fmt;

use crate::error::{AppError, Result};
use crate::models::{Answer, Field, Page, Question, User};
use crate::services::pagination::{self, total_pages};
use crate::services::{Limit, listings};
use crate::session::{AjaxEndpoint, AjaxQuery, EnvelopeLayout, Session};
use crate::utils::{self, dom, url};

/// Above this many pages the answer count is read from the creator's
/// collection list instead of summing every page.
const MAX_PAGES_TO_COUNT: usize = 3;

const ANSWER_ITEMS: &str = "#zh-list-answer-wrap div.zm-item-fav";
const QUESTION_TITLES: &str = "#zh-list-answer-wrap h2.zm-item-title";

/// A collection (favorites list) page.
#[derive(Debug, Clone)]
pub struct Collection {
    page: Page,
    name: String,
    creator: Option<User>,
}

impl Collection {
    pub fn new(
        session: &Session,
        link: impl Into<String>,
        name: impl Into<String>,
        creator: Option<User>,
    ) -> Result<Self> {
        let link = link.into();
        if !url::is_collection_link(&link) {
            return Err(AppError::invalid_link("collection", link));
        }
        Ok(Self {
            page: Page::new(session.clone(), link),
            name: name.into(),
            creator,
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
                self.name = utils::strip(&dom::first_text(doc, "h2#zh-fav-head-title")).to_string();
            }
        }
        self.name.clone()
    }

    pub fn creator(&mut self) -> Option<User> {
        if self.creator.is_none() {
            let session = self.page.session().clone();
            let doc = self.page.document()?;
            let link = dom::select_first(doc, "h2.zm-list-content-title a")?;
            self.creator = Some(listings::user_from_link(
                &session,
                &dom::text(link),
                &dom::attr(link, "href"),
            ));
        }
        self.creator.clone()
    }

    pub fn followers_num(&mut self) -> i64 {
        self.page.cached_int(Field::FollowersNum, |doc| {
            utils::strip(&dom::first_text(doc, r#"a[data-za-a="visit_collection_followers"]"#))
                .trim()
                .parse()
                .unwrap_or(0)
        })
    }

    pub fn comments_num(&mut self) -> i64 {
        self.page.cached_int(Field::CommentsNum, |doc| {
            utils::first_int(utils::strip(&dom::first_text(
                doc,
                "div#zh-list-meta-wrap a.toggle-comment",
            )))
        })
    }

    pub fn followers_n(&mut self, limit: impl Into<Limit>) -> Vec<User> {
        let limit = limit.into();
        if limit.is_zero() {
            return Vec::new();
        }
        let session = self.page.session().clone();
        let link = url::join(self.link(), "followers");
        let endpoint = AjaxEndpoint {
            url: link.clone(),
            referer: link,
            query: AjaxQuery::Offset,
            layout: EnvelopeLayout::CountThenFragment,
            page_size: session.paging().page_size,
        };
        let xsrf = self.page.xsrf();
        pagination::collect_by_offset(&session, &endpoint, &xsrf, limit, Vec::new(), |doc, out| {
            listings::profile_cards(&session, doc, out)
        })
        .unwrap_or_default()
    }

    pub fn followers(&mut self) -> Vec<User> {
        self.followers_n(Limit::All)
    }

    pub fn questions_n(&mut self, limit: impl Into<Limit>) -> Vec<Question> {
        let limit = limit.into();
        if limit.is_zero() {
            return Vec::new();
        }
        let session = self.page.session().clone();
        let link = self.link().to_string();
        let Some(first) = self.page.document() else {
            return Vec::new();
        };
        pagination::collect_pages(&session, &link, first, limit, |doc, out| {
            listings::collection_questions(&session, doc, out)
        })
        .unwrap_or_default()
    }

    pub fn questions(&mut self) -> Vec<Question> {
        self.questions_n(Limit::All)
    }

    pub fn answers_n(&mut self, limit: impl Into<Limit>) -> Vec<Answer> {
        let limit = limit.into();
        if limit.is_zero() {
            return Vec::new();
        }
        let session = self.page.session().clone();
        let link = self.link().to_string();
        let Some(first) = self.page.document() else {
            return Vec::new();
        };
        let mut last_question = None;
        pagination::collect_pages(&session, &link, first, limit, |doc, out| {
            listings::collection_answers(&session, doc, &mut last_question, out)
        })
        .unwrap_or_default()
    }

    pub fn answers(&mut self) -> Vec<Answer> {
        self.answers_n(Limit::All)
    }

    /// Every page but the last holds a full page of questions.
    pub fn questions_num(&mut self) -> i64 {
        if let Some(value) = self.page.fields().int(Field::QuestionsNum) {
            return value;
        }
        let session = self.page.session().clone();
        let link = self.link().to_string();
        let Some(first) = self.page.document() else {
            return 0;
        };

        let pages = total_pages(first);
        let on_last_page = if pages > 1 {
            match session.document(&url::page_link(&link, pages)) {
                Ok(last) => dom::select_all(&last, QUESTION_TITLES).len(),
                Err(e) => {
                    log::error!("Failed to fetch the last page of {link}: {e}");
                    return 0;
                }
            }
        } else {
            dom::select_all(first, QUESTION_TITLES).len()
        };

        let value = ((pages - 1) * session.paging().collection_page_size + on_last_page) as i64;
        self.page.seed(Field::QuestionsNum, value);
        value
    }

    /// Number of collected answers.
    ///
    /// Short collections are counted page by page; long ones are looked up
    /// on the creator's `/collections` list, which shows the count.
    pub fn answers_num(&mut self) -> i64 {
        if let Some(value) = self.page.fields().int(Field::AnswersNum) {
            return value;
        }
        let Some(pages) = self.page.document().map(total_pages) else {
            return 0;
        };

        let counted = if pages > MAX_PAGES_TO_COUNT {
            self.count_on_creator_page()
        } else {
            self.count_by_pages(pages)
        };
        match counted {
            Ok(value) => {
                self.page.seed(Field::AnswersNum, value);
                value
            }
            Err(e) => {
                log::error!("Failed to count answers of {}: {e}", self.link());
                0
            }
        }
    }

    fn count_by_pages(&mut self, pages: usize) -> Result<i64> {
        let session = self.page.session().clone();
        let link = self.link().to_string();
        let mut count = self
            .page
            .document()
            .map(|doc| dom::select_all(doc, ANSWER_ITEMS).len())
            .unwrap_or(0);
        for page in 2..=pages {
            let doc = session.document(&url::page_link(&link, page))?;
            count += dom::select_all(&doc, ANSWER_ITEMS).len();
        }
        Ok(count as i64)
    }

    fn count_on_creator_page(&mut self) -> Result<i64> {
        let Some(creator) = self.creator().filter(|c| !c.is_anonymous()) else {
            return Err(AppError::validation("collection has no known creator"));
        };
        let path = url::site_path(self.link())
            .ok_or_else(|| AppError::validation(format!("bad collection link {}", self.link())))?;
        let session = self.page.session().clone();
        let base = url::join(creator.link(), "collections");

        let mut page = 1;
        loop {
            let doc = session.document(&url::page_link(&base, page))?;
            if let Some(count) = listings::fav_answers_count(&doc, &path) {
                return Ok(count);
            }
            if page >= total_pages(&doc) {
                log::warn!("{path} not found on {base}");
                return Ok(0);
            }
            page += 1;
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Collection: {} - {}>", self.name, self.link())
    }
}
