//! Pull session ids and message indices out of free text.

use std::sync::LazyLock;

use maila_types::session::SID_TOKEN_LEN;
use regex::Regex;

use crate::text::mentions_any;

static SESSION_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b([a-z0-9]{{{SID_TOKEN_LEN}}})\b")).expect("static regex")
});
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d+)\b").expect("static regex"));
static INDEX_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\s*-\s*\d+|\d+").expect("static regex"));

/// A session token of [`SID_TOKEN_LEN`] characters, if the text contains one.
pub fn session_id(input: &str) -> Option<String> {
    SESSION_ID
        .captures(&input.to_lowercase())
        .map(|c| c[1].to_string())
}

/// The first standalone number in the text.
pub fn email_position(input: &str) -> Option<usize> {
    NUMBER
        .captures(input)
        .and_then(|c| c[1].parse::<usize>().ok())
}

/// An index expression (`"all"`, `"1,3"`, `"2-5"`) found in the text.
///
/// `verb` is removed first so "delete all" and "delete 2" both work in
/// the state that asked which messages to delete.
pub fn index_expr(input: &str, verb: &str) -> Option<String> {
    let text = input.to_lowercase().replace(verb, " ");
    if mentions_any(&text, &["all"]) {
        return Some("all".to_string());
    }
    let items: Vec<String> = INDEX_ITEM
        .find_iter(&text)
        .map(|m| m.as_str().split_whitespace().collect::<String>())
        .collect();
    (!items.is_empty()).then(|| items.join(","))
}
