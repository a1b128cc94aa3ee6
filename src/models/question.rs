// src/models/question.rs

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{Answer, Field, Page, Topic, User};
use crate::services::{Limit, listings, pagination};
use crate::session::{AjaxEndpoint, AjaxQuery, EnvelopeLayout, Session};
use crate::utils::{self, dom, url};

/// A question page.
#[derive(Debug, Clone)]
pub struct Question {
    page: Page,
    title: String,
}

impl Question {
    /// Create a question from its canonical link; the title may be empty and
    /// is then read from the page on demand.
    pub fn new(session: &Session, link: impl Into<String>, title: impl Into<String>) -> Result<Self> {
        let link = link.into();
        if !url::is_question_link(&link) {
            return Err(AppError::invalid_link("question", link));
        }
        Ok(Self {
            page: Page::new(session.clone(), link),
            title: title.into(),
        })
    }

    pub fn link(&self) -> &str {
        self.page.link()
    }

    /// Numeric id of the question, as found in its link.
    pub fn url_token(&self) -> u64 {
        url::trailing_id(self.link()).unwrap_or(0)
    }

    /// A copy without the fetched document, for handing to child entities.
    pub fn detached(&self) -> Self {
        Self {
            page: self.page.detached(),
            title: self.title.clone(),
        }
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.page.refresh()
    }

    pub fn title(&mut self) -> String {
        if self.title.is_empty() {
            if let Some(doc) = self.page.document() {
                self.title = utils::strip(&dom::first_text(doc, "h2.zm-item-title")).to_string();
            }
        }
        self.title.clone()
    }

    pub fn detail(&mut self) -> String {
        self.page.cached_text(Field::Detail, |doc| {
            utils::strip(&dom::first_text(doc, "div#zh-question-detail")).to_string()
        })
    }

    pub fn answers_num(&mut self) -> i64 {
        self.page.cached_int(Field::AnswersNum, |doc| {
            dom::first_attr(doc, "h3#zh-question-answer-num", "data-num")
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(0)
        })
    }

    pub fn followers_num(&mut self) -> i64 {
        self.page.cached_int(Field::FollowersNum, |doc| {
            dom::first_text(doc, "div.zg-gray-normal>a>strong")
                .trim()
                .parse()
                .unwrap_or(0)
        })
    }

    pub fn comments_num(&mut self) -> i64 {
        self.page.cached_int(Field::CommentsNum, |doc| {
            utils::first_int(utils::strip(&dom::first_text(
                doc,
                "div.zm-meta-panel a.toggle-comment",
            )))
        })
    }

    pub fn visit_times(&mut self) -> i64 {
        self.page.cached_int(Field::VisitTimes, |doc| {
            dom::first_attr(doc, r#"meta[itemprop="visitsCount"]"#, "content")
                .and_then(|n| n.trim().parse().ok())
                .unwrap_or(0)
        })
    }

    pub fn xsrf(&mut self) -> String {
        self.page.xsrf()
    }

    /// Topics the question is tagged with.
    pub fn topics(&mut self) -> Vec<Topic> {
        let session = self.page.session().clone();
        let Some(doc) = self.page.document() else {
            return Vec::new();
        };
        dom::select_all(doc, "a.zm-item-tag")
            .into_iter()
            .filter_map(|tag| {
                let link = url::make_link(&dom::attr(tag, "href"));
                Topic::new(&session, link, utils::strip(&dom::text(tag)))
                    .inspect_err(|e| log::warn!("Skipping topic: {e}"))
                    .ok()
            })
            .collect()
    }

    /// First users following the question.
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

    /// Highest ranked answers, never more than the question announces.
    ///
    /// The question page carries the first batch; later ones are loaded
    /// through `QuestionAnswerListV2`.
    pub fn top_answers(&mut self, limit: impl Into<Limit>) -> Vec<Answer> {
        let limit = limit.into();
        if limit.is_zero() {
            return Vec::new();
        }
        let total = self.answers_num().max(0) as usize;
        let limit = limit.min(Limit::AtMost(total));
        if limit.is_zero() {
            return Vec::new();
        }

        let session = self.page.session().clone();
        let handle = self.detached();
        let mut first = Vec::new();
        match self.page.document() {
            Some(doc) => listings::question_answers(&session, &handle, doc, &mut first),
            None => return Vec::new(),
        }
        if limit.is_met(first.len()) {
            limit.truncate(&mut first);
            return first;
        }

        let page_size = session.paging().answer_page_size;
        let mut params = Map::new();
        params.insert("url_token".to_string(), Value::from(self.url_token()));
        params.insert("pagesize".to_string(), Value::from(page_size));
        let endpoint = AjaxEndpoint {
            url: url::make_link("/node/QuestionAnswerListV2"),
            referer: self.link().to_string(),
            query: AjaxQuery::NodeParams(params),
            layout: EnvelopeLayout::FragmentList,
            page_size,
        };
        let xsrf = self.page.xsrf();
        pagination::collect_by_offset(&session, &endpoint, &xsrf, limit, first, |doc, out| {
            listings::question_answers(&session, &handle, doc, out)
        })
        .unwrap_or_default()
    }

    pub fn all_answers(&mut self) -> Vec<Answer> {
        self.top_answers(Limit::All)
    }

    pub fn top_answer(&mut self) -> Option<Answer> {
        self.top_answers(1_usize).into_iter().next()
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Question: {} - {}>", self.title, self.link())
    }
}
