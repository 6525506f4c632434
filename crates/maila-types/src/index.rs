//! Index expression resolution.
//!
//! Users refer to messages by their 1-based position in the last listing
//! ("1", "1, 3", "2-5", "all"). Positions are not durable across
//! mutations, so every expression is resolved to mail ids against an
//! inbox snapshot before anything is deleted or downloaded.
//!
//! Grammar:
//!
//! ```text
//! expr  := "all" | item ("," item)*
//! item  := int | int "-" int
//! ```
//!
//! Out-of-range integers are dropped, ranges are clamped to `[1, len]`,
//! and reversed or malformed items are dropped silently.

use std::collections::BTreeSet;

use crate::inbox::Inbox;

/// Resolve an expression to 1-based positions within an inbox of `len` entries.
pub fn resolve_positions(expr: &str, len: usize) -> BTreeSet<usize> {
    let expr = expr.trim();
    if expr.eq_ignore_ascii_case("all") {
        return (1..=len).collect();
    }

    let mut positions = BTreeSet::new();
    for part in expr.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let (Ok(start), Ok(end)) = (start.trim().parse::<i64>(), end.trim().parse::<i64>())
            else {
                continue;
            };
            let start = start.max(1);
            let end = end.min(len as i64);
            if start > end {
                continue;
            }
            positions.extend((start..=end).map(|p| p as usize));
        } else if let Ok(position) = part.parse::<usize>()
            && (1..=len).contains(&position)
        {
            positions.insert(position);
        }
    }
    positions
}

/// Resolve an expression to mail ids, in display order.
///
/// An empty result means the expression named no valid message.
pub fn resolve(inbox: &Inbox, expr: &str) -> Vec<String> {
    resolve_positions(expr, inbox.len())
        .into_iter()
        .filter_map(|p| inbox.at_position(p))
        .map(|e| e.mail_id.clone())
        .collect()
}
