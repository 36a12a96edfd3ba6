//! Wikitext excerpts shown for a changed region

use super::lines::OffsetPair;
use crate::dom::span::slice_chars;

/// Characters of surrounding text shown on each side of a semantic change.
pub const WIDE_CONTEXT: usize = 25;

/// The old and new text of `pair`, widened by `context` characters on each
/// side:
///
/// ```text
/// ----
/// {old}
/// ++++
/// {new}
/// ```
pub fn excerpt(old_wt: &str, new_wt: &str, pair: &OffsetPair, context: usize) -> String {
    format!(
        "----\n{}\n++++\n{}",
        window(old_wt, pair.old.start, pair.old.end, context),
        window(new_wt, pair.new.start, pair.new.end, context),
    )
}

fn window(text: &str, start: Option<usize>, end: Option<usize>, context: usize) -> &str {
    let start = start.unwrap_or(0).saturating_sub(context);
    let end = end.unwrap_or(usize::MAX).saturating_add(context);
    slice_chars(text, start, end)
}
