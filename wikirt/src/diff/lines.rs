//! Line diff of two wikitexts, as character-offset regions

use crate::dom::SourceSpan;
use similar::{ChangeTag, TextDiff};

/// One contiguous changed region, as parallel ranges in the old and new text.
///
/// Both sides always have known bounds; a zero-length side marks an insertion
/// point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetPair {
    pub old: SourceSpan,
    pub new: SourceSpan,
}

impl OffsetPair {
    pub fn new(old: (usize, usize), new: (usize, usize)) -> Self {
        OffsetPair {
            old: SourceSpan::new(old.0, old.1),
            new: SourceSpan::new(new.0, new.1),
        }
    }

    /// Start of the old range, used to label the region in reports.
    pub fn old_start(&self) -> usize {
        self.old.start.unwrap_or(0)
    }
}

/// Diff `old` against `new` line by line and turn each run of consecutive
/// changed lines into one [`OffsetPair`]. Offsets count characters and cover
/// the changed lines including their newlines.
pub fn diff_offsets(old: &str, new: &str) -> Vec<OffsetPair> {
    let diff = TextDiff::from_lines(old, new);

    let mut pairs = Vec::new();
    let mut old_pos = 0;
    let mut new_pos = 0;
    let mut pending: Option<OffsetPair> = None;

    for change in diff.iter_all_changes() {
        let len = change.value().chars().count();
        match change.tag() {
            ChangeTag::Equal => {
                pairs.extend(pending.take());
                old_pos += len;
                new_pos += len;
            }
            ChangeTag::Delete => {
                let pair = pending
                    .get_or_insert_with(|| OffsetPair::new((old_pos, old_pos), (new_pos, new_pos)));
                old_pos += len;
                pair.old.end = Some(old_pos);
            }
            ChangeTag::Insert => {
                let pair = pending
                    .get_or_insert_with(|| OffsetPair::new((old_pos, old_pos), (new_pos, new_pos)));
                new_pos += len;
                pair.new.end = Some(new_pos);
            }
        }
    }
    pairs.extend(pending);
    pairs
}
