// src/utils/url.rs

//! URL building and link shape validation.

use regex::Regex;

/// Root every site-relative href is resolved against.
pub const BASE_URL: &str = "http://www.zhihu.com/";

/// Build an absolute zhihu link from a site path.
///
/// # Examples
/// ```
/// use zhihu::utils::url::make_link;
///
/// assert_eq!(make_link("/people/zonyitoo"), "http://www.zhihu.com/people/zonyitoo");
/// ```
pub fn make_link(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{BASE_URL}{}", path.trim_start_matches('/'))
}

/// Append a path segment to an entity link.
///
/// # Examples
/// ```
/// use zhihu::utils::url::join;
///
/// assert_eq!(
///     join("https://www.zhihu.com/question/12345678", "/followers"),
///     "https://www.zhihu.com/question/12345678/followers"
/// );
/// ```
pub fn join(link: &str, path: &str) -> String {
    format!(
        "{}/{}",
        link.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Link of page `page` of a paginated listing.
pub fn page_link(base: &str, page: usize) -> String {
    format!("{base}?page={page}")
}

fn matches_entity(kind: &str, link: &str) -> bool {
    let pattern = format!(r"^(http|https)://www\.zhihu\.com/{kind}/[0-9]{{8}}$");
    Regex::new(&pattern)
        .map(|re| re.is_match(link))
        .unwrap_or(false)
}

/// Whether the link is the canonical address of a question.
pub fn is_question_link(link: &str) -> bool {
    matches_entity("question", link)
}

/// Whether the link is the canonical address of a collection.
pub fn is_collection_link(link: &str) -> bool {
    matches_entity("collection", link)
}

/// Whether the link is the canonical address of a topic.
pub fn is_topic_link(link: &str) -> bool {
    matches_entity("topic", link)
}

/// Whether the link points at a user profile.
pub fn is_user_link(link: &str) -> bool {
    Regex::new(r"^(http|https)://www\.zhihu\.com/people/[^/?#]+/?$")
        .map(|re| re.is_match(link))
        .unwrap_or(false)
}

/// Numeric id at the end of an entity link.
pub fn trailing_id(link: &str) -> Option<u64> {
    let re = Regex::new(r"/(\d+)/?$").ok()?;
    re.captures(link)?.get(1)?.as_str().parse().ok()
}

/// Site path of a link, e.g. `/collection/19677733`.
pub fn site_path(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    Some(parsed.path().to_string())
}

/// Question part of an answer href such as `/question/1/answer/2`.
pub fn question_of_answer(href: &str) -> &str {
    match href.find("/answer/") {
        Some(idx) => &href[..idx],
        None => href,
    }
}

/// Real destination of a `link.zhihu.com/?target=...` redirect.
pub fn redirect_target(href: &str) -> Option<String> {
    if !href.contains("target=") {
        return None;
    }
    let parsed = url::Url::parse(href).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "target")
        .map(|(_, value)| value.into_owned())
}
