// src/services/listings.rs

//! Item extraction for every paginated listing.
//!
//! Each function reads one page or AJAX batch and appends the entities it
//! finds, in document order. Items whose link does not validate are skipped
//! with a warning; authors that cannot be resolved become anonymous.

use scraper::{ElementRef, Html};

use crate::models::{Answer, Collection, Field, Question, Topic, User};
use crate::services::export;
use crate::session::Session;
use crate::utils::{self, dom, url};

/// User behind a display name and profile href.
pub fn user_from_link(session: &Session, name: &str, href: &str) -> User {
    let name = utils::strip(name);
    if utils::is_anonymous_name(name) || href.is_empty() {
        return User::anonymous();
    }
    match User::new(session, url::make_link(href), name) {
        Ok(user) => user,
        Err(e) => {
            log::warn!("Treating {name} as anonymous: {e}");
            User::anonymous()
        }
    }
}

/// Author of an answer from its `div.zm-item-answer-author-info` block.
pub fn author_from_info(session: &Session, info: Option<ElementRef<'_>>) -> User {
    let Some(info) = info else {
        return User::anonymous();
    };
    match dom::find_first(info, "a.author-link") {
        Some(link) => user_from_link(session, &dom::text(link), &dom::attr(link, "href")),
        None => User::anonymous(),
    }
}

fn question_from_link(session: &Session, href: &str, title: &str) -> Option<Question> {
    match Question::new(session, url::make_link(href), utils::strip(title)) {
        Ok(question) => Some(question),
        Err(e) => {
            log::warn!("Skipping question: {e}");
            None
        }
    }
}

/// Users of follower cards (`div.zm-profile-card`).
pub fn profile_cards(session: &Session, document: &Html, out: &mut Vec<User>) {
    for card in dom::select_all(document, "div.zm-profile-card") {
        let user = match dom::find_first(card, "h2.zm-list-content-title a.zg-link") {
            Some(link) => user_from_link(session, &dom::text(link), &dom::attr(link, "href")),
            None => User::anonymous(),
        };
        out.push(user);
    }
}

/// Answers of a question page or of a `QuestionAnswerListV2` batch.
pub fn question_answers(
    session: &Session,
    question: &Question,
    document: &Html,
    out: &mut Vec<Answer>,
) {
    for item in dom::select_all(document, "div.zm-item-answer") {
        out.push(question_answer(session, question, item));
    }
}

fn question_answer(session: &Session, question: &Question, item: ElementRef<'_>) -> Answer {
    let href = dom::find_first(item, "a.answer-date-link")
        .map(|a| dom::attr(a, "href"))
        .unwrap_or_default();
    let author = author_from_info(
        session,
        dom::find_first(item, "div.zm-item-answer-author-info"),
    );

    let mut answer = Answer::new(
        session,
        url::make_link(&href),
        Some(question.clone()),
        Some(author),
    );

    // own answers have no vote bar
    let vote_text = if dom::attr(item, "data-isowner") == "1" {
        dom::find_first(item, "a.zm-item-vote-count").map(dom::text)
    } else {
        dom::find_first(item, "div.zm-votebar span.count").map(dom::text)
    };
    answer.seed(
        Field::Upvote,
        utils::parse_count(utils::strip(&vote_text.unwrap_or_default())),
    );

    if let Some(content) = dom::find_first(item, "div.zm-editable-content") {
        answer.seed(Field::Content, export::answer_html(content));
    }
    answer
}

/// Questions of a collection page.
pub fn collection_questions(session: &Session, document: &Html, out: &mut Vec<Question>) {
    for link in dom::select_all(document, "div#zh-list-answer-wrap h2.zm-item-title a") {
        if let Some(question) = question_from_link(session, &dom::attr(link, "href"), &dom::text(link)) {
            out.push(question);
        }
    }
}

/// Answers of a collection page.
///
/// Answers collected under the same question only show the question heading
/// once; `last_question` carries it to the following items, across pages.
pub fn collection_answers(
    session: &Session,
    document: &Html,
    last_question: &mut Option<Question>,
    out: &mut Vec<Answer>,
) {
    for item in dom::select_all(document, "div.zm-item") {
        let Some(content) = dom::find_first(item, "div.zm-item-rich-text") else {
            let reason = dom::find_first(item, "div.answer-status")
                .map(dom::text)
                .unwrap_or_default();
            log::warn!("Skipping collected answer: {}", utils::strip(&reason).trim());
            continue;
        };

        if let Some(link) = dom::find_first(item, "h2.zm-item-title a") {
            *last_question =
                question_from_link(session, &dom::attr(link, "href"), &dom::text(link));
        }

        let author = author_from_info(
            session,
            dom::find_first(item, "div.zm-item-answer-author-info"),
        );
        let mut answer = Answer::new(
            session,
            url::make_link(&dom::attr(content, "data-entry-url")),
            last_question.clone(),
            Some(author),
        );
        let votes = dom::find_first(item, "a.zm-item-vote-count")
            .map(|a| dom::attr(a, "data-votecount"))
            .unwrap_or_default();
        answer.seed(Field::Upvote, votes.trim().parse::<i64>().unwrap_or(0));
        out.push(answer);
    }
}

/// Questions on a page of a user's `/asks`.
pub fn user_asks(session: &Session, document: &Html, out: &mut Vec<Question>) {
    for link in dom::select_all(document, "div.zm-profile-section-item a.question_link") {
        if let Some(question) = question_from_link(session, &dom::attr(link, "href"), &dom::text(link)) {
            out.push(question);
        }
    }
}

/// Answers on a page of a user's `/answers`.
pub fn user_answers(session: &Session, author: &User, document: &Html, out: &mut Vec<Answer>) {
    for item in dom::select_all(document, "div.zm-item") {
        let Some(link) = dom::find_first(item, "a.question_link") else {
            continue;
        };
        let href = dom::attr(link, "href");
        let question = question_from_link(session, url::question_of_answer(&href), &dom::text(link));

        let mut answer = Answer::new(session, url::make_link(&href), question, Some(author.clone()));
        if let Some(votes) = dom::find_first(item, "a.zm-item-vote-count") {
            answer.seed(Field::Upvote, utils::parse_count(&dom::attr(votes, "data-votecount")));
        }
        out.push(answer);
    }
}

/// Collections on a page of a user's `/collections`.
pub fn user_collections(
    session: &Session,
    creator: &User,
    document: &Html,
    out: &mut Vec<Collection>,
) {
    for link in dom::select_all(document, "a.zm-profile-fav-item-title") {
        let name = dom::text(link);
        match Collection::new(
            session,
            url::make_link(&dom::attr(link, "href")),
            utils::strip(&name),
            Some(creator.clone()),
        ) {
            Ok(collection) => out.push(collection),
            Err(e) => log::warn!("Skipping collection: {e}"),
        }
    }
}

/// Topics of a followed-topics batch.
pub fn user_topics(session: &Session, document: &Html, out: &mut Vec<Topic>) {
    for item in dom::select_all(document, "div.zm-profile-section-item") {
        let href = dom::find_first(item, "a.zm-list-avatar-link")
            .map(|a| dom::attr(a, "href"))
            .unwrap_or_default();
        let name = dom::find_first(item, "strong")
            .map(dom::text)
            .unwrap_or_default();
        match Topic::new(session, url::make_link(&href), utils::strip(&name)) {
            Ok(topic) => out.push(topic),
            Err(e) => log::warn!("Skipping topic: {e}"),
        }
    }
}

/// Answers a user voted up, from the activity feed of the profile page.
pub fn voted_answers(session: &Session, document: &Html, out: &mut Vec<Answer>) {
    let selector = r#"div.zm-profile-section-item[data-type-detail="member_voteup_answer"]"#;
    for item in dom::select_all(document, selector) {
        let Some(link) = dom::find_first(item, "a.question_link") else {
            continue;
        };
        let href = dom::attr(link, "href");
        let question = question_from_link(session, url::question_of_answer(&href), &dom::text(link));
        let author = author_from_info(
            session,
            dom::find_first(item, "div.zm-item-answer-author-info"),
        );

        let mut answer = Answer::new(session, url::make_link(&href), question, Some(author));
        if let Some(votes) = dom::find_first(item, "a.zm-item-vote-count") {
            answer.seed(Field::Upvote, utils::parse_count(&dom::attr(votes, "data-votecount")));
        }
        out.push(answer);
    }
}

/// Answer count shown next to a collection title on its creator's
/// `/collections` page.
pub fn fav_answers_count(document: &Html, collection_path: &str) -> Option<i64> {
    let selector = format!(r#"a.zm-profile-fav-item-title[href="{collection_path}"]"#);
    let title = dom::select_first(document, &selector)?;
    let heading = title.parent().and_then(ElementRef::wrap)?;
    let meta = heading.next_siblings().find_map(ElementRef::wrap)?;
    let first = meta.children().next()?;
    let text = match first.value() {
        scraper::Node::Text(text) => text.to_string(),
        scraper::Node::Element(_) => ElementRef::wrap(first).map(dom::text)?,
        _ => return None,
    };
    Some(utils::first_int(&text))
}
