//! Utility functions and helpers.

pub mod dom;
pub mod fs;
pub mod http;
pub mod url;

/// Trim leading and trailing newlines, leaving other whitespace alone.
pub fn strip(text: &str) -> &str {
    text.trim_matches('\n')
}

/// Parse a counter in zhihu's abbreviated notation.
///
/// `"3K"` is 3 000, `"2W"` is 20 000 (万), anything else is read as a plain
/// integer. Text that does not parse yields 0.
pub fn parse_count(text: &str) -> i64 {
    let text = text.trim();
    if let Some(head) = text.strip_suffix('K') {
        return scaled(head, 1_000);
    }
    if let Some(head) = text.strip_suffix('W') {
        return scaled(head, 10_000);
    }
    text.parse().unwrap_or(0)
}

fn scaled(head: &str, unit: i64) -> i64 {
    head.parse::<i64>()
        .ok()
        .and_then(|n| n.checked_mul(unit))
        .unwrap_or(0)
}

/// Read the first run of digits in a sentence such as `"12 条评论"`.
pub fn first_int(text: &str) -> i64 {
    let Ok(re) = regex::Regex::new(r"\d+") else {
        return 0;
    };
    re.find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Whether a displayed user name is one of the anonymous placeholders.
pub fn is_anonymous_name(name: &str) -> bool {
    matches!(name, "匿名用户" | "知乎用户")
}
