// src/models/user.rs

//! Users: named profiles and the anonymous placeholder.
//!
//! Every profile accessor on [`User::Anonymous`] returns a zero value
//! without touching the network.

use std::fmt;

use scraper::Html;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{Answer, Collection, Field, FieldValue, Page, Question, Topic};
use crate::services::{Limit, listings, pagination};
use crate::session::{AjaxEndpoint, AjaxQuery, EnvelopeLayout, Session};
use crate::utils::{self, dom, url};

const ANONYMOUS_NAME: &str = "匿名用户";

/// Gender shown on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }

    fn from_cached(value: &str) -> Self {
        match value {
            "male" => Gender::Male,
            "female" => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user with a profile page.
#[derive(Debug, Clone)]
pub struct NamedUser {
    page: Page,
    user_id: String,
}

/// A zhihu user.
#[derive(Debug, Clone)]
pub enum User {
    /// Answers and votes posted without a name; there is no profile page.
    Anonymous,
    Named(NamedUser),
}

/// Profile list endpoints keyed by the user's `hash_id`.
#[derive(Debug, Clone, Copy)]
enum Relation {
    Followers,
    Followees,
}

impl Relation {
    fn node(self) -> &'static str {
        match self {
            Relation::Followers => "/node/ProfileFollowersListV2",
            Relation::Followees => "/node/ProfileFolloweesListV2",
        }
    }

    fn path(self) -> &'static str {
        match self {
            Relation::Followers => "followers",
            Relation::Followees => "followees",
        }
    }
}

impl User {
    /// Create a user from a profile link and display name.
    ///
    /// The anonymous placeholder names always yield [`User::Anonymous`];
    /// otherwise the link must point at a profile page. The name may be
    /// empty and is then read from the page on demand.
    pub fn new(session: &Session, link: impl Into<String>, user_id: impl Into<String>) -> Result<Self> {
        let user_id = user_id.into();
        if utils::is_anonymous_name(&user_id) {
            return Ok(User::Anonymous);
        }
        let link = link.into();
        if !url::is_user_link(&link) {
            return Err(AppError::invalid_link("user", link));
        }
        Ok(User::Named(NamedUser {
            page: Page::new(session.clone(), link),
            user_id,
        }))
    }

    pub fn anonymous() -> Self {
        User::Anonymous
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, User::Anonymous)
    }

    /// Profile link, empty for the anonymous user.
    pub fn link(&self) -> &str {
        match self {
            User::Anonymous => "",
            User::Named(user) => user.page.link(),
        }
    }

    pub fn refresh(&mut self) -> Result<()> {
        match self {
            User::Anonymous => Ok(()),
            User::Named(user) => user.page.refresh(),
        }
    }

    pub(crate) fn seed(&mut self, field: Field, value: impl Into<FieldValue>) {
        if let User::Named(user) = self {
            user.page.seed(field, value);
        }
    }

    fn profile_int(&mut self, field: Field, extract: impl FnOnce(&Html) -> i64) -> i64 {
        match self {
            User::Anonymous => 0,
            User::Named(user) => user.page.cached_int(field, extract),
        }
    }

    fn profile_text(&mut self, field: Field, extract: impl FnOnce(&Html) -> String) -> String {
        match self {
            User::Anonymous => String::new(),
            User::Named(user) => user.page.cached_text(field, extract),
        }
    }

    pub fn user_id(&mut self) -> String {
        let user = match self {
            User::Anonymous => return ANONYMOUS_NAME.to_string(),
            User::Named(user) => user,
        };
        if user.user_id.is_empty() {
            if let Some(doc) = user.page.document() {
                user.user_id = utils::strip(&dom::first_text(
                    doc,
                    "div.title-section.ellipsis span.name",
                ))
                .to_string();
            }
        }
        user.user_id.clone()
    }

    /// Internal id used as `hash_id` by the profile list endpoints.
    pub fn data_id(&mut self) -> String {
        self.profile_text(Field::DataId, |doc| {
            dom::first_attr(doc, "button.zg-btn.zm-rich-follow-btn", "data-id").unwrap_or_default()
        })
    }

    pub fn bio(&mut self) -> String {
        self.profile_text(Field::Bio, |doc| {
            dom::first_attr(doc, "span.bio", "title").unwrap_or_default()
        })
    }

    pub fn location(&mut self) -> String {
        self.profile_text(Field::Location, |doc| {
            dom::first_attr(doc, "span.location", "title").unwrap_or_default()
        })
    }

    pub fn business(&mut self) -> String {
        self.profile_text(Field::Business, |doc| {
            dom::first_attr(doc, "span.business", "title").unwrap_or_default()
        })
    }

    pub fn gender(&mut self) -> Gender {
        if self.is_anonymous() {
            return Gender::Unknown;
        }
        let cached = self.profile_text(Field::Gender, |doc| {
            let gender = match dom::select_first(doc, "span.gender i") {
                Some(icon) if dom::has_class(icon, "icon-profile-male") => Gender::Male,
                Some(icon) if dom::has_class(icon, "icon-profile-female") => Gender::Female,
                _ => Gender::Unknown,
            };
            gender.as_str().to_string()
        });
        Gender::from_cached(&cached)
    }

    pub fn followees_num(&mut self) -> i64 {
        self.profile_int(Field::FolloweesNum, |doc| side_following(doc, 0))
    }

    pub fn followers_num(&mut self) -> i64 {
        self.profile_int(Field::FollowersNum, |doc| side_following(doc, 1))
    }

    pub fn followed_columns_num(&mut self) -> i64 {
        self.profile_int(Field::FollowedColumnsNum, |doc| side_section(doc, "专栏"))
    }

    pub fn followed_topics_num(&mut self) -> i64 {
        self.profile_int(Field::FollowedTopicsNum, |doc| side_section(doc, "话题"))
    }

    pub fn agree_num(&mut self) -> i64 {
        self.profile_int(Field::AgreeNum, |doc| {
            utils::parse_count(&dom::first_text(doc, "span.zm-profile-header-user-agree strong"))
        })
    }

    pub fn thanks_num(&mut self) -> i64 {
        self.profile_int(Field::ThanksNum, |doc| {
            utils::parse_count(&dom::first_text(doc, "span.zm-profile-header-user-thanks strong"))
        })
    }

    pub fn asks_num(&mut self) -> i64 {
        self.profile_int(Field::AsksNum, |doc| navbar_count(doc, 0))
    }

    pub fn answers_num(&mut self) -> i64 {
        self.profile_int(Field::AnswersNum, |doc| navbar_count(doc, 1))
    }

    pub fn posts_num(&mut self) -> i64 {
        self.profile_int(Field::PostsNum, |doc| navbar_count(doc, 2))
    }

    pub fn collections_num(&mut self) -> i64 {
        self.profile_int(Field::CollectionsNum, |doc| navbar_count(doc, 3))
    }

    pub fn logs_num(&mut self) -> i64 {
        self.profile_int(Field::LogsNum, |doc| navbar_count(doc, 4))
    }

    fn relation_n(&mut self, relation: Relation, limit: Limit) -> Vec<User> {
        if self.is_anonymous() || limit.is_zero() {
            return Vec::new();
        }
        let hash_id = self.data_id();
        let User::Named(user) = self else {
            return Vec::new();
        };
        let session = user.page.session().clone();
        let page_size = session.paging().page_size;

        let mut params = Map::new();
        params.insert("order_by".to_string(), Value::from("created"));
        params.insert("hash_id".to_string(), Value::from(hash_id));
        let endpoint = AjaxEndpoint {
            url: url::make_link(relation.node()),
            referer: url::join(user.page.link(), relation.path()),
            query: AjaxQuery::NodeParams(params),
            layout: EnvelopeLayout::FragmentList,
            page_size,
        };
        let xsrf = user.page.xsrf();
        pagination::collect_by_offset(&session, &endpoint, &xsrf, limit, Vec::new(), |doc, out| {
            listings::profile_cards(&session, doc, out)
        })
        .unwrap_or_default()
    }

    pub fn followers_n(&mut self, limit: impl Into<Limit>) -> Vec<User> {
        self.relation_n(Relation::Followers, limit.into())
    }

    pub fn followers(&mut self) -> Vec<User> {
        self.followers_n(Limit::All)
    }

    pub fn followees_n(&mut self, limit: impl Into<Limit>) -> Vec<User> {
        self.relation_n(Relation::Followees, limit.into())
    }

    pub fn followees(&mut self) -> Vec<User> {
        self.followees_n(Limit::All)
    }

    pub fn followed_topics_n(&mut self, limit: impl Into<Limit>) -> Vec<Topic> {
        let limit = limit.into();
        let User::Named(user) = self else {
            return Vec::new();
        };
        if limit.is_zero() {
            return Vec::new();
        }
        let session = user.page.session().clone();
        let link = url::join(user.page.link(), "topics");
        let endpoint = AjaxEndpoint {
            url: link.clone(),
            referer: link,
            query: AjaxQuery::Offset,
            layout: EnvelopeLayout::CountThenFragment,
            page_size: session.paging().page_size,
        };
        let xsrf = user.page.xsrf();
        pagination::collect_by_offset(&session, &endpoint, &xsrf, limit, Vec::new(), |doc, out| {
            listings::user_topics(&session, doc, out)
        })
        .unwrap_or_default()
    }

    pub fn followed_topics(&mut self) -> Vec<Topic> {
        self.followed_topics_n(Limit::All)
    }

    /// Walk one of the `?page=N` lists under the profile.
    fn profile_pages<T>(
        &self,
        path: &str,
        limit: Limit,
        mut extract: impl FnMut(&Session, &Html, &mut Vec<T>),
    ) -> Vec<T> {
        let User::Named(user) = self else {
            return Vec::new();
        };
        if limit.is_zero() {
            return Vec::new();
        }
        let session = user.page.session();
        let base = url::join(user.page.link(), path);
        let first = match session.document(&base) {
            Ok(first) => first,
            Err(e) => {
                log::error!("Failed to fetch {base}: {e}");
                return Vec::new();
            }
        };
        pagination::collect_pages(session, &base, &first, limit, |doc, out| {
            extract(session, doc, out)
        })
        .unwrap_or_default()
    }

    pub fn asks_n(&mut self, limit: impl Into<Limit>) -> Vec<Question> {
        self.profile_pages("asks", limit.into(), listings::user_asks)
    }

    pub fn asks(&mut self) -> Vec<Question> {
        self.asks_n(Limit::All)
    }

    pub fn answers_n(&mut self, limit: impl Into<Limit>) -> Vec<Answer> {
        let author = self.handle();
        self.profile_pages("answers", limit.into(), |session, doc, out| {
            listings::user_answers(session, &author, doc, out)
        })
    }

    pub fn answers(&mut self) -> Vec<Answer> {
        self.answers_n(Limit::All)
    }

    pub fn collections_n(&mut self, limit: impl Into<Limit>) -> Vec<Collection> {
        let creator = self.handle();
        self.profile_pages("collections", limit.into(), |session, doc, out| {
            listings::user_collections(session, &creator, doc, out)
        })
    }

    pub fn collections(&mut self) -> Vec<Collection> {
        self.collections_n(Limit::All)
    }

    /// Answers the user voted up, as listed in the profile activity feed.
    pub fn likes_n(&mut self, limit: impl Into<Limit>) -> Vec<Answer> {
        let limit = limit.into();
        let User::Named(user) = self else {
            return Vec::new();
        };
        if limit.is_zero() {
            return Vec::new();
        }
        let session = user.page.session().clone();
        let Some(doc) = user.page.document() else {
            return Vec::new();
        };
        let mut answers = Vec::new();
        listings::voted_answers(&session, doc, &mut answers);
        limit.truncate(&mut answers);
        answers
    }

    pub fn likes(&mut self) -> Vec<Answer> {
        self.likes_n(Limit::All)
    }

    pub fn voted_answers(&mut self) -> Vec<Answer> {
        self.likes()
    }

    /// A copy without the fetched document, for handing to child entities.
    pub fn handle(&self) -> User {
        match self {
            User::Anonymous => User::Anonymous,
            User::Named(user) => User::Named(NamedUser {
                page: user.page.detached(),
                user_id: user.user_id.clone(),
            }),
        }
    }
}

fn side_following(doc: &Html, index: usize) -> i64 {
    dom::select_all(doc, "div.zm-profile-side-following a.item strong")
        .get(index)
        .map(|strong| utils::parse_count(&dom::text(*strong)))
        .unwrap_or(0)
}

fn side_section(doc: &Html, keyword: &str) -> i64 {
    dom::select_all(doc, "div.zm-profile-side-section-title")
        .into_iter()
        .find(|title| dom::text(*title).contains(keyword))
        .and_then(|title| dom::find_first(title, "a strong"))
        .map(|strong| utils::first_int(&dom::text(strong)))
        .unwrap_or(0)
}

fn navbar_count(doc: &Html, index: usize) -> i64 {
    dom::select_all(doc, "div.profile-navbar a.item span.num")
        .get(index)
        .map(|num| utils::parse_count(&dom::text(*num)))
        .unwrap_or(0)
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            User::Anonymous => write!(f, "<User: {ANONYMOUS_NAME}>"),
            User::Named(user) => write!(f, "<User: {} - {}>", user.user_id, user.page.link()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeFetcher, list_envelope, profile_card, session, session_with};

    const LINK: &str = "http://www.zhihu.com/people/zonyitoo";

    const PROFILE: &str = r#"<html><body>
<input type="hidden" name="_xsrf" value="f00">
<div class="title-section ellipsis"><span class="name">zonyitoo</span></div>
<span class="bio" title="Rustacean">Rustacean</span>
<span class="location item" title="深圳">深圳</span>
<span class="business item" title="互联网">互联网</span>
<span class="item gender"><i class="icon icon-profile-female"></i></span>
<button class="zg-btn zg-btn-follow zm-rich-follow-btn" data-id="0970f947b898ecc0ec035f9126dd4e08">关注</button>
<span class="zm-profile-header-user-agree"><strong>3K</strong>赞同</span>
<span class="zm-profile-header-user-thanks"><strong>512</strong>感谢</span>
<div class="profile-navbar">
<a class="item" href="/people/zonyitoo/asks">提问<span class="num">3</span></a>
<a class="item" href="/people/zonyitoo/answers">回答<span class="num">120</span></a>
<a class="item" href="/people/zonyitoo/posts">文章<span class="num">4</span></a>
<a class="item" href="/people/zonyitoo/collections">收藏<span class="num">5</span></a>
<a class="item" href="/people/zonyitoo/logs">公共编辑<span class="num">6</span></a>
</div>
<div class="zm-profile-side-following">
<a class="item" href="/people/zonyitoo/followees"><span>关注了</span><br><strong>88</strong></a>
<a class="item" href="/people/zonyitoo/followers"><span>关注者</span><br><strong>2W</strong></a>
</div>
<div class="zm-profile-side-section-title"><a href="/people/zonyitoo/columns/followed"><strong>7 个专栏</strong></a></div>
<div class="zm-profile-side-section-title"><a href="/people/zonyitoo/topics"><strong>19 个话题</strong></a></div>
<div class="zm-profile-section-item zm-item" data-type-detail="member_voteup_answer">
<a class="question_link" href="/question/23759686/answer/41997389">Rust 好学吗？</a>
<div class="zm-item-answer"><div class="zm-item-answer-author-info"><a class="author-link" href="/people/someone">someone</a></div>
<a class="zm-item-vote-count" data-votecount="42">42</a></div>
</div>
<div class="zm-profile-section-item zm-item" data-type-detail="member_follow_question"></div>
</body></html>"#;

    fn named(fake: &std::rc::Rc<FakeFetcher>) -> User {
        fake.page(LINK, PROFILE);
        User::new(&session(fake), LINK, "").unwrap()
    }

    #[test]
    fn test_anonymous_names() {
        let fake = FakeFetcher::new();
        let session = session(&fake);
        assert!(User::new(&session, "", "匿名用户").unwrap().is_anonymous());
        assert!(User::new(&session, LINK, "知乎用户").unwrap().is_anonymous());
        assert!(User::new(&session, "", "someone").is_err());
    }

    #[test]
    fn test_anonymous_guard_makes_no_request() {
        let fake = FakeFetcher::new();
        let mut user = User::anonymous();

        assert_eq!(user.user_id(), "匿名用户");
        assert_eq!(user.link(), "");
        assert_eq!(user.followers_num(), 0);
        assert_eq!(user.agree_num(), 0);
        assert_eq!(user.bio(), "");
        assert_eq!(user.gender(), Gender::Unknown);
        assert!(user.followers().is_empty());
        assert!(user.followed_topics().is_empty());
        assert!(user.asks().is_empty());
        assert!(user.likes().is_empty());
        assert!(user.refresh().is_ok());
        assert_eq!(user.to_string(), "<User: 匿名用户>");
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn test_profile_fields() {
        let fake = FakeFetcher::new();
        let mut user = named(&fake);

        assert_eq!(user.user_id(), "zonyitoo");
        assert_eq!(user.data_id(), "0970f947b898ecc0ec035f9126dd4e08");
        assert_eq!(user.bio(), "Rustacean");
        assert_eq!(user.location(), "深圳");
        assert_eq!(user.business(), "互联网");
        assert_eq!(user.gender(), Gender::Female);
        assert_eq!(user.agree_num(), 3000);
        assert_eq!(user.thanks_num(), 512);
        assert_eq!(user.followees_num(), 88);
        assert_eq!(user.followers_num(), 20000);
        assert_eq!(user.followed_columns_num(), 7);
        assert_eq!(user.followed_topics_num(), 19);
        assert_eq!(
            [user.asks_num(), user.answers_num(), user.posts_num(), user.collections_num(), user.logs_num()],
            [3, 120, 4, 5, 6]
        );
        assert_eq!(user.to_string(), format!("<User: zonyitoo - {LINK}>"));
        assert_eq!(fake.gets().len(), 1);
    }

    #[test]
    fn test_seeded_bio_wins() {
        let fake = FakeFetcher::new();
        let mut user = User::new(&session(&fake), LINK, "zonyitoo").unwrap();
        user.seed(Field::Bio, "from topic");
        assert_eq!(user.bio(), "from topic");
        assert_eq!(user.user_id(), "zonyitoo");
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn test_followers_by_hash_id() {
        let fake = FakeFetcher::new();
        let node = "http://www.zhihu.com/node/ProfileFollowersListV2";
        let cards = |r: std::ops::Range<usize>| -> Vec<String> {
            r.map(|i| profile_card(&format!("f{i}"))).collect()
        };
        fake.ajax(node, list_envelope(&cards(0..2)));
        fake.ajax(node, list_envelope(&cards(2..3)));
        fake.page(LINK, PROFILE);
        let mut user = User::new(&session_with(&fake, 2), LINK, "").unwrap();

        let followers = user.followers();
        assert_eq!(followers.len(), 3);
        assert_eq!(followers[2].link(), "http://www.zhihu.com/people/f2");

        let posts = fake.posts();
        assert_eq!(posts.len(), 2);
        let params: Value = serde_json::from_str(posts[1].field("params").unwrap()).unwrap();
        assert_eq!(params["hash_id"], "0970f947b898ecc0ec035f9126dd4e08");
        assert_eq!(params["order_by"], "created");
        assert_eq!(params["offset"], 2);
    }

    #[test]
    fn test_answers_over_pages() {
        let fake = FakeFetcher::new();
        let item = |n: usize| {
            format!(
                r#"<div class="zm-item"><a class="question_link" href="/question/2375968{n}/answer/{n}">q{n}</a><a class="zm-item-vote-count" data-votecount="{n}"></a></div>"#
            )
        };
        let pager = r#"<div class="zm-invite-pager"><span>1</span><span>2</span></div>"#;
        fake.page(&format!("{LINK}/answers"), format!("{}{}{pager}", item(1), item(2)));
        fake.page(&format!("{LINK}/answers?page=2"), format!("{}{pager}", item(3)));
        let mut user = User::new(&session(&fake), LINK, "zonyitoo").unwrap();

        let mut answers = user.answers();
        assert_eq!(answers.len(), 3);
        assert_eq!(answers[2].upvote(), 3);
        assert_eq!(
            answers[0].cached_question().map(|q| q.link().to_string()).as_deref(),
            Some("http://www.zhihu.com/question/23759681")
        );
        assert_eq!(answers[0].author().map(|a| a.link().to_string()).as_deref(), Some(LINK));

        assert_eq!(user.answers_n(2_usize).len(), 2);
        assert_eq!(fake.gets().len(), 3);
    }

    #[test]
    fn test_likes_from_activity_feed() {
        let fake = FakeFetcher::new();
        let mut user = named(&fake);
        let mut likes = user.voted_answers();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].link(), "http://www.zhihu.com/question/23759686/answer/41997389");
        assert_eq!(likes[0].upvote(), 42);
        assert!(user.likes_n(0_usize).is_empty());
    }
}
