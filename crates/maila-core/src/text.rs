//! Small text utilities shared by the handlers.
//!
//! Matching is word-based: input is lowercased and split on anything that
//! is not alphanumeric, so "yes!" and "Yes, please" both contain the word
//! `yes` while "eyes" does not.

use std::collections::HashSet;

/// Lowercased alphanumeric tokens, in order.
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether any of `words` occurs as a whole word in `text`.
///
/// Multi-word entries match as a contiguous token run.
pub fn mentions_any(text: &str, words: &[&str]) -> bool {
    let toks = tokens(text);
    words.iter().any(|w| {
        let needle = tokens(w);
        !needle.is_empty() && toks.windows(needle.len()).any(|win| win == needle.as_slice())
    })
}

/// Reduce a token to a crude stem so "emails" matches "email".
pub fn stem(token: &str) -> &str {
    if token.len() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        &token[..token.len() - 1]
    } else {
        token
    }
}

/// Stemmed tokens that carry meaning for matching.
///
/// Tokens containing digits (indices, session ids) and very long tokens are
/// dropped: they identify things rather than express intent.
pub fn content_terms(text: &str) -> HashSet<String> {
    tokens(text)
        .iter()
        .filter(|t| t.len() < 20 && !t.chars().any(|c| c.is_ascii_digit()))
        .map(|t| stem(t).to_string())
        .collect()
}

/// Cosine similarity between two binary bags of terms.
pub fn overlap_score(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count() as f32;
    shared / ((a.len() * b.len()) as f32).sqrt()
}

/// Uppercase the first character and lowercase the rest.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_split_on_punctuation() {
        assert_eq!(tokens("Yes, please!"), vec!["yes", "please"]);
        assert_eq!(tokens("delete 1-3"), vec!["delete", "1", "3"]);
        assert!(tokens("?!").is_empty());
    }

    #[test]
    fn mentions_whole_words_only() {
        assert!(mentions_any("Yes please", &["yes"]));
        assert!(!mentions_any("my eyes hurt", &["yes"]));
        assert!(!mentions_any("I know", &["no"]));
        assert!(mentions_any("no thanks", &["no", "nevermind"]));
    }

    #[test]
    fn mentions_multi_word() {
        assert!(mentions_any("I like small talk a lot", &["small talk"]));
        assert!(!mentions_any("talk small", &["small talk"]));
    }

    #[test]
    fn stem_strips_plural() {
        assert_eq!(stem("emails"), "email");
        assert_eq!(stem("address"), "address");
        assert_eq!(stem("yes"), "yes");
    }

    #[test]
    fn content_terms_drop_ids_and_numbers() {
        let terms = content_terms("restore session abcdefghijklmnopqrstuvwxyz 42");
        assert!(terms.contains("restore"));
        assert!(terms.contains("session"));
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn overlap_of_identical_sets_is_one() {
        let a = content_terms("list my emails");
        assert!((overlap_score(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(overlap_score(&a, &HashSet::new()), 0.0);
    }

    #[test]
    fn capitalize_words() {
        assert_eq!(capitalize("aLICE"), "Alice");
        assert_eq!(capitalize(""), "");
    }
}
