// src/services/pagination.rs

//! Aggregation of listings that span several pages or AJAX batches.
//!
//! Two walks are supported:
//!
//! - [`collect_pages`]: classic `?page=N` pagination. The number of pages is
//!   read from the pager of page 1.
//! - [`collect_by_offset`]: offset-based AJAX batches. The offset advances by
//!   the number of items each batch returned; a batch shorter than the
//!   endpoint page size is the last one.
//!
//! Both stop as soon as the [`Limit`] is met and keep remote order. Any fetch
//! error aborts the walk: callers get an `Err`, never a partial list.

use scraper::Html;

use crate::error::Result;
use crate::session::{AjaxEndpoint, Session};
use crate::utils::{dom, url};

/// How many items a listing call should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Every available item.
    All,
    /// At most this many items; `AtMost(0)` makes no request.
    AtMost(usize),
}

impl Limit {
    pub fn is_zero(self) -> bool {
        self == Limit::AtMost(0)
    }

    /// Whether `count` collected items satisfy the limit.
    pub fn is_met(self, count: usize) -> bool {
        match self {
            Limit::All => false,
            Limit::AtMost(n) => count >= n,
        }
    }

    /// The smaller of two limits.
    pub fn min(self, other: Limit) -> Limit {
        match (self, other) {
            (Limit::All, other) => other,
            (this, Limit::All) => this,
            (Limit::AtMost(a), Limit::AtMost(b)) => Limit::AtMost(a.min(b)),
        }
    }

    /// Cut a list down to the limit.
    pub fn truncate<T>(self, items: &mut Vec<T>) {
        if let Limit::AtMost(n) = self {
            items.truncate(n);
        }
    }
}

impl From<i64> for Limit {
    /// Negative counts mean "all".
    fn from(n: i64) -> Self {
        if n < 0 {
            Limit::All
        } else {
            Limit::AtMost(n as usize)
        }
    }
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        Limit::AtMost(n)
    }
}

/// Number of pages announced by a listing's pager, 1 without a pager.
pub fn total_pages(document: &Html) -> usize {
    dom::select_all(document, "div.zm-invite-pager span")
        .into_iter()
        .filter_map(|span| dom::text(span).trim().parse::<usize>().ok())
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Walk `?page=N` pages of `base_link`.
///
/// `first` is page 1, already fetched by the caller. `extract` appends the
/// items of one page to the accumulator; it sees pages in order, so it may
/// carry state from one page to the next.
pub fn collect_pages<T, F>(
    session: &Session,
    base_link: &str,
    first: &Html,
    limit: Limit,
    mut extract: F,
) -> Result<Vec<T>>
where
    F: FnMut(&Html, &mut Vec<T>),
{
    let mut items = Vec::new();
    if limit.is_zero() {
        return Ok(items);
    }

    extract(first, &mut items);
    let pages = total_pages(first);
    let mut page = 2;
    while page <= pages && !limit.is_met(items.len()) {
        let link = url::page_link(base_link, page);
        let document = session.document(&link).inspect_err(|e| {
            log::error!("Failed to fetch page {page}/{pages} of {base_link}: {e}");
        })?;
        extract(&document, &mut items);
        page += 1;
    }

    limit.truncate(&mut items);
    Ok(items)
}

/// Walk AJAX batches of `endpoint`, starting after the `seed` items.
///
/// The first offset is `seed.len()`, so a listing whose first batch was
/// served inline with the page continues where that batch ended.
pub fn collect_by_offset<T, F>(
    session: &Session,
    endpoint: &AjaxEndpoint,
    xsrf: &str,
    limit: Limit,
    seed: Vec<T>,
    mut extract: F,
) -> Result<Vec<T>>
where
    F: FnMut(&Html, &mut Vec<T>),
{
    let mut items = seed;
    if limit.is_zero() {
        items.clear();
        return Ok(items);
    }

    let mut offset = items.len();
    while !limit.is_met(items.len()) {
        let batch = session.ajax(endpoint, xsrf, offset).inspect_err(|e| {
            log::error!(
                "Failed to load batch at offset {offset} from {}: {e}",
                endpoint.url
            );
        })?;
        extract(&batch.document, &mut items);
        log::debug!(
            "{}: offset {offset} returned {} item(s)",
            endpoint.url,
            batch.returned
        );

        if batch.returned == 0 || batch.returned < endpoint.page_size {
            break;
        }
        offset += batch.returned;
    }

    limit.truncate(&mut items);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AjaxQuery, EnvelopeLayout};
    use crate::testing::{FakeFetcher, counted_envelope, profile_card, session_with};

    const BASE: &str = "https://www.zhihu.com/collection/19677733";
    const FOLLOWERS: &str = "https://www.zhihu.com/question/12345678/followers";

    fn listing_page(range: std::ops::Range<usize>, pages: usize) -> String {
        let mut html = String::new();
        for i in range {
            html.push_str(&format!(r#"<li class="item">{i}</li>"#));
        }
        html.push_str(r#"<div class="zm-invite-pager">"#);
        for p in 1..=pages {
            html.push_str(&format!("<span>{p}</span>"));
        }
        html.push_str("<span>下一页</span></div>");
        html
    }

    fn numbers(doc: &Html, out: &mut Vec<usize>) {
        for li in dom::select_all(doc, "li.item") {
            if let Ok(n) = dom::text(li).parse() {
                out.push(n);
            }
        }
    }

    /// 25 items over 3 pages of 10; page 1 is served by the caller.
    fn paged_fixture() -> (std::rc::Rc<FakeFetcher>, Html) {
        let fake = FakeFetcher::new();
        fake.page(&format!("{BASE}?page=2"), listing_page(10..20, 3));
        fake.page(&format!("{BASE}?page=3"), listing_page(20..25, 3));
        (fake, Html::parse_document(&listing_page(0..10, 3)))
    }

    fn followers_endpoint(page_size: usize) -> AjaxEndpoint {
        AjaxEndpoint {
            url: FOLLOWERS.to_string(),
            referer: FOLLOWERS.to_string(),
            query: AjaxQuery::Offset,
            layout: EnvelopeLayout::CountThenFragment,
            page_size,
        }
    }

    fn cards(range: std::ops::Range<usize>) -> String {
        range.map(|i| profile_card(&format!("user{i}"))).collect()
    }

    fn names(doc: &Html, out: &mut Vec<String>) {
        for a in dom::select_all(doc, "div.zm-profile-card a.zg-link") {
            out.push(dom::text(a));
        }
    }

    #[test]
    fn test_limit_from_i64() {
        assert_eq!(Limit::from(-1_i64), Limit::All);
        assert_eq!(Limit::from(0_i64), Limit::AtMost(0));
        assert_eq!(Limit::from(15_i64), Limit::AtMost(15));
        assert_eq!(Limit::All.min(Limit::AtMost(3)), Limit::AtMost(3));
        assert_eq!(Limit::AtMost(9).min(Limit::AtMost(3)), Limit::AtMost(3));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(&Html::parse_document(&listing_page(0..1, 7))), 7);
        assert_eq!(total_pages(&Html::parse_document("<p>no pager</p>")), 1);
    }

    #[test]
    fn test_total_pages_never_zero() {
        let pager = r#"<div class="zm-invite-pager"><span>0</span></div>"#;
        assert_eq!(total_pages(&Html::parse_document(pager)), 1);
    }

    #[test]
    fn test_offsets_empty_batch_ends_walk_without_page_size() {
        let fake = FakeFetcher::new();
        fake.ajax(FOLLOWERS, counted_envelope(2, &cards(0..2)));
        fake.ajax(FOLLOWERS, counted_envelope(0, ""));
        let session = session_with(&fake, 10);

        let users = collect_by_offset(
            &session,
            &followers_endpoint(0),
            "tok",
            Limit::All,
            Vec::new(),
            names,
        )
        .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(fake.posts().len(), 2);
    }

    #[test]
    fn test_pages_all_in_order() {
        let (fake, first) = paged_fixture();
        let session = session_with(&fake, 10);
        let items = collect_pages(&session, BASE, &first, Limit::All, numbers).unwrap();
        assert_eq!(items, (0..25).collect::<Vec<_>>());
        assert_eq!(fake.gets().len(), 2);
    }

    #[test]
    fn test_pages_stop_early() {
        let (fake, first) = paged_fixture();
        let session = session_with(&fake, 10);
        let items = collect_pages(&session, BASE, &first, Limit::AtMost(15), numbers).unwrap();
        assert_eq!(items, (0..15).collect::<Vec<_>>());
        assert_eq!(fake.gets(), vec![format!("{BASE}?page=2")]);
    }

    #[test]
    fn test_pages_limit_within_first_page() {
        let (fake, first) = paged_fixture();
        let session = session_with(&fake, 10);
        let items = collect_pages(&session, BASE, &first, Limit::AtMost(4), numbers).unwrap();
        assert_eq!(items, vec![0, 1, 2, 3]);
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn test_pages_zero_limit() {
        let (fake, first) = paged_fixture();
        let session = session_with(&fake, 10);
        let items = collect_pages(&session, BASE, &first, Limit::AtMost(0), numbers).unwrap();
        assert!(items.is_empty());
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn test_pages_failure_is_fatal() {
        let fake = FakeFetcher::new();
        fake.page(&format!("{BASE}?page=2"), listing_page(10..20, 3));
        let first = Html::parse_document(&listing_page(0..10, 3));
        let session = session_with(&fake, 10);
        let result = collect_pages(&session, BASE, &first, Limit::All, numbers);
        assert!(result.is_err());
    }

    #[test]
    fn test_pages_carry_state_across_pages() {
        let (fake, first) = paged_fixture();
        let session = session_with(&fake, 10);
        let mut pages_seen = 0;
        let items = collect_pages(&session, BASE, &first, Limit::All, |doc, out: &mut Vec<(usize, usize)>| {
            pages_seen += 1;
            let mut page_items = Vec::new();
            numbers(doc, &mut page_items);
            out.extend(page_items.into_iter().map(|n| (pages_seen, n)));
        })
        .unwrap();
        assert_eq!(items.first(), Some(&(1, 0)));
        assert_eq!(items.last(), Some(&(3, 24)));
    }

    #[test]
    fn test_offsets_twelve_followers() {
        let fake = FakeFetcher::new();
        fake.ajax(FOLLOWERS, counted_envelope(10, &cards(0..10)));
        fake.ajax(FOLLOWERS, counted_envelope(2, &cards(10..12)));
        let session = session_with(&fake, 10);

        let users = collect_by_offset(
            &session,
            &followers_endpoint(10),
            "tok",
            Limit::All,
            Vec::new(),
            names,
        )
        .unwrap();

        assert_eq!(users.len(), 12);
        assert_eq!(users[0], "user0");
        assert_eq!(users[11], "user11");
        let offsets: Vec<_> = fake
            .posts()
            .iter()
            .map(|r| r.field("offset").unwrap_or_default().to_string())
            .collect();
        assert_eq!(offsets, vec!["0", "10"]);
    }

    #[test]
    fn test_offsets_stop_at_limit() {
        let fake = FakeFetcher::new();
        fake.ajax(FOLLOWERS, counted_envelope(10, &cards(0..10)));
        fake.ajax(FOLLOWERS, counted_envelope(10, &cards(10..20)));
        let session = session_with(&fake, 10);

        let users = collect_by_offset(
            &session,
            &followers_endpoint(10),
            "tok",
            Limit::AtMost(5),
            Vec::new(),
            names,
        )
        .unwrap();

        assert_eq!(users, (0..5).map(|i| format!("user{i}")).collect::<Vec<_>>());
        assert_eq!(fake.posts().len(), 1);
    }

    #[test]
    fn test_offsets_exact_multiple_ends_on_empty_batch() {
        let fake = FakeFetcher::new();
        fake.ajax(FOLLOWERS, counted_envelope(10, &cards(0..10)));
        fake.ajax(FOLLOWERS, counted_envelope(0, ""));
        let session = session_with(&fake, 10);

        let users = collect_by_offset(
            &session,
            &followers_endpoint(10),
            "tok",
            Limit::All,
            Vec::new(),
            names,
        )
        .unwrap();
        assert_eq!(users.len(), 10);
        assert_eq!(fake.posts().len(), 2);
    }

    #[test]
    fn test_offsets_start_after_seed() {
        let fake = FakeFetcher::new();
        fake.ajax(FOLLOWERS, counted_envelope(3, &cards(10..13)));
        let session = session_with(&fake, 10);
        let seed: Vec<String> = (0..10).map(|i| format!("user{i}")).collect();

        let users = collect_by_offset(
            &session,
            &followers_endpoint(10),
            "tok",
            Limit::All,
            seed,
            names,
        )
        .unwrap();
        assert_eq!(users.len(), 13);
        assert_eq!(fake.posts()[0].field("offset"), Some("10"));
    }

    #[test]
    fn test_offsets_zero_limit_makes_no_request() {
        let fake = FakeFetcher::new();
        let session = session_with(&fake, 10);
        let users = collect_by_offset(
            &session,
            &followers_endpoint(10),
            "tok",
            Limit::AtMost(0),
            Vec::new(),
            names,
        )
        .unwrap();
        assert!(users.is_empty());
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn test_offsets_failure_is_fatal() {
        let fake = FakeFetcher::new();
        fake.ajax(FOLLOWERS, counted_envelope(10, &cards(0..10)));
        fake.ajax(FOLLOWERS, "not json");
        let session = session_with(&fake, 10);
        let result = collect_by_offset(
            &session,
            &followers_endpoint(10),
            "tok",
            Limit::All,
            Vec::new(),
            names,
        );
        assert!(result.is_err());
    }
}
