//! Terminal rendering for a viewed email.
//!
//! Provider bodies are HTML. The terminal gets a plain-text approximation:
//! block-level tags become line breaks, remaining tags are dropped, the
//! common entities are decoded and runs of blank lines collapse to one.

use std::sync::LazyLock;

use chrono::SecondsFormat;
use maila_mail::EmailMessage;
use regex::Regex;

static BREAK_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<\s*(br|/p|/div|/li|/tr|/h[1-6])\b[^>]*>").expect("static regex")
});
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<\s*(script|style)\b.*?<\s*/\s*(script|style)\s*>").expect("static regex")
});
static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

const RULE_WIDTH: usize = 60;

/// Plain-text version of an HTML body.
pub fn html_to_text(html: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(html, "");
    let text = BREAK_TAGS.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();
    BLANK_RUNS
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Framed view: headers, a rule, then the body.
pub fn render_message(message: &EmailMessage) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let date = message
        .received_at()
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "unknown".into());
    let from: &str = if message.from.is_empty() {
        "(unknown sender)"
    } else {
        &message.from
    };
    let subject: &str = if message.subject.is_empty() {
        "(no subject)"
    } else {
        &message.subject
    };

    format!(
        "{rule}\nFrom:    {from}\nSubject: {subject}\nDate:    {date}\n{rule}\n{}\n{rule}",
        html_to_text(&message.body)
    )
}
