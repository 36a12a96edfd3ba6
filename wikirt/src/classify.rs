//! Significance classification of changed regions
//!
//! A region of the wikitext diff is *syntactic* (`Skip`) when the markup it
//! maps to renders the same, and *semantic* (`Fail`) otherwise. Classification
//! is two-staged: the HTML fragments for the region must differ, and so must
//! the normalized wikitext excerpts, because many HTML-level differences come
//! from the renderer and not from the source.
//!
//! Before any per-region work, the canonical bodies of the two documents are
//! compared. When they are equal every region is syntactic and the HTML
//! differ is never consulted. Documents containing foster-parented content
//! skip this shortcut because fostering reorders nodes relative to the
//! source.

use crate::align::find_matching_nodes;
use crate::diff::{excerpt, HtmlDiffer, LineHtmlDiff, OffsetPair, WIDE_CONTEXT};
use crate::dom::{AnnotatedDocument, SourceSpan};
use crate::normalize::{canonical_body, canonical_nodes, normalize_wikitext};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

static IMPLICIT_CLOSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\n?</[^>]+>\n?$").expect("valid regex for a lone closing tag"));

/// Verdict for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    /// Cosmetic (syntactic) difference
    Skip,
    /// Meaning-changing (semantic) difference
    Fail,
}

/// Classification of one changed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub offset: OffsetPair,
    pub kind: DiffKind,
    /// `----`/`++++` excerpt of the old and new wikitext
    pub wt_diff: String,
    /// Set for semantic differences only
    pub html_diff: Option<String>,
    /// Produced by the selective-serialization pass
    pub selser: bool,
}

impl DiffResult {
    pub fn is_semantic(&self) -> bool {
        self.kind == DiffKind::Fail
    }
}

/// Both sides of a comparison: annotated document plus the wikitext it came
/// from.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub doc: &'a AnnotatedDocument,
    pub wikitext: &'a str,
}

impl<'a> Side<'a> {
    pub fn new(doc: &'a AnnotatedDocument, wikitext: &'a str) -> Self {
        Side { doc, wikitext }
    }
}

pub struct Classifier {
    differ: Box<dyn HtmlDiffer>,
    parallel: bool,
}

impl Classifier {
    pub fn new(differ: Box<dyn HtmlDiffer>) -> Self {
        Classifier {
            differ,
            parallel: false,
        }
    }

    /// Classify regions on the rayon thread pool. Results keep input order.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Classify every region, in input order. Never fails: a region that
    /// matches no nodes compares as an empty fragment.
    pub fn classify(&self, offsets: &[OffsetPair], old: Side<'_>, new: Side<'_>) -> Vec<DiffResult> {
        if offsets.is_empty() {
            return Vec::new();
        }

        if !old.doc.is_fostered()
            && !new.doc.is_fostered()
            && canonical_body(old.doc) == canonical_body(new.doc)
        {
            tracing::debug!(regions = offsets.len(), "documents render identically");
            return offsets
                .iter()
                .map(|pair| DiffResult {
                    offset: *pair,
                    kind: DiffKind::Skip,
                    wt_diff: excerpt(old.wikitext, new.wikitext, pair, 0),
                    html_diff: None,
                    selser: false,
                })
                .collect();
        }

        let old_len = old.wikitext.chars().count();
        let new_len = new.wikitext.chars().count();
        let classify_one = |pair: &OffsetPair| self.classify_region(*pair, old, new, old_len, new_len);

        if self.parallel {
            offsets.par_iter().map(classify_one).collect()
        } else {
            offsets.iter().map(classify_one).collect()
        }
    }

    fn classify_region(
        &self,
        pair: OffsetPair,
        old: Side<'_>,
        new: Side<'_>,
        old_len: usize,
        new_len: usize,
    ) -> DiffResult {
        let offset = adjust_implicit_close(pair, new.wikitext);

        let old_html = fragment(old.doc, offset.old, old_len);
        let new_html = fragment(new.doc, offset.new, new_len);

        let mut result = DiffResult {
            offset,
            kind: DiffKind::Skip,
            wt_diff: excerpt(old.wikitext, new.wikitext, &offset, 0),
            html_diff: None,
            selser: false,
        };

        if let Some(html_diff) = self.differ.diff(&old_html, &new_html) {
            let old_norm = normalize_wikitext(offset.old.slice(old.wikitext));
            let new_norm = normalize_wikitext(offset.new.slice(new.wikitext));
            if old_norm != new_norm {
                result.kind = DiffKind::Fail;
                result.wt_diff = excerpt(old.wikitext, new.wikitext, &offset, WIDE_CONTEXT);
                result.html_diff = Some(html_diff);
            }
        }

        tracing::debug!(
            old_start = offset.old_start(),
            kind = ?result.kind,
            "classified region"
        );
        result
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(Box::new(LineHtmlDiff::default()))
    }
}

/// An insertion whose new text is just a closing tag is re-anchored one
/// character back, onto the element being closed.
fn adjust_implicit_close(pair: OffsetPair, new_wt: &str) -> OffsetPair {
    let zero_length = pair.old.start.is_some() && pair.old.start == pair.old.end;
    if zero_length && IMPLICIT_CLOSE.is_match(pair.new.slice(new_wt)) {
        let mut adjusted = pair;
        adjusted.old.start = pair.old.start.map(|start| start.saturating_sub(1));
        return adjusted;
    }
    pair
}

fn fragment(doc: &AnnotatedDocument, span: SourceSpan, source_len: usize) -> String {
    let nodes = find_matching_nodes(doc, doc.body(), span, source_len).unwrap_or_default();
    canonical_nodes(doc, &nodes)
}
