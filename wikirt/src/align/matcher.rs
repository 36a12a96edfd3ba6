//! Range-to-node alignment
//!
//! Given a `[start, end)` range of the source text, find the smallest set of
//! sibling nodes whose combined source covers it. Elements are located by
//! their decoded spans; span-less text and comments are placed by counting
//! characters from the nearest known position.
//!
//! The walk is depth-first with a single [`MatchState`] threaded through it.
//! Once a node is known to start the match, `waiting_for_end` stays set and
//! every following sibling is taken whole until one reaches the range end.
//! Opaque blocks (transclusions, parameters, extensions) are never split.

use super::encapsulation::{encapsulated_group, skip_encapsulated};
use super::length::source_length;
use crate::dom::{AnnotatedDocument, NodeId, SourceSpan};

/// Traversal state shared by every recursive step of one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchState {
    /// Estimated source position reached by the nodes matched so far
    pub current_offset: Option<usize>,
    /// A start has been matched and the end has not been reached yet
    pub waiting_for_end: bool,
}

impl MatchState {
    /// Whether a match is in progress and has not yet reached `end`.
    pub fn region_open(&self, end: usize) -> bool {
        self.waiting_for_end || self.current_offset.is_some_and(|offset| offset < end)
    }

    fn advance(&mut self, len: usize) {
        if let Some(offset) = self.current_offset.as_mut() {
            *offset += len;
        }
    }

    fn reached(&self, end: usize) -> bool {
        !self.waiting_for_end && self.current_offset.is_some_and(|offset| offset >= end)
    }
}

/// Matched nodes at one level of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// The match is complete; callers stop scanning siblings
    pub done: bool,
    /// Consecutive siblings, in document order; never empty
    pub nodes: Vec<NodeId>,
}

impl MatchResult {
    fn single(id: NodeId, done: bool) -> Self {
        MatchResult {
            done,
            nodes: vec![id],
        }
    }
}

/// Matcher for one target range over one document.
pub struct NodeMatcher<'a> {
    doc: &'a AnnotatedDocument,
    start: usize,
    end: usize,
    source_len: usize,
}

impl<'a> NodeMatcher<'a> {
    /// `source_len` is the length of the source text, used to resolve unknown
    /// span ends.
    pub fn new(doc: &'a AnnotatedDocument, target: SourceSpan, source_len: usize) -> Self {
        let (start, end) = target.resolve(source_len);
        NodeMatcher {
            doc,
            start,
            end,
            source_len,
        }
    }

    /// Match beneath `root`. The root is treated as spanning the whole
    /// document when it carries no span of its own.
    pub fn find(&self, root: NodeId) -> Option<Vec<NodeId>> {
        let mut state = MatchState::default();
        let span = self.doc.span(root).unwrap_or_else(SourceSpan::unknown);
        self.match_node(root, Some(span), &mut state)
            .map(|result| result.nodes)
    }

    /// One step of the walk: decide `id` from its span, recursing into its
    /// children when it straddles a boundary of the target.
    pub fn match_node(
        &self,
        id: NodeId,
        span: Option<SourceSpan>,
        state: &mut MatchState,
    ) -> Option<MatchResult> {
        let opaque = self.doc.marker(id).is_opaque();

        let Some(span) = span else {
            if opaque {
                return state
                    .region_open(self.end)
                    .then(|| MatchResult::single(id, false));
            }
            return self.match_children(id, state);
        };

        let (start, end) = span.resolve(self.source_len);
        if self.end <= start || self.start >= end {
            return None;
        }

        if state.waiting_for_end {
            state.current_offset = Some(end);
            if end >= self.end {
                state.waiting_for_end = false;
            }
            return Some(MatchResult::single(id, !state.waiting_for_end));
        }

        let genuine_start = span.start.is_some();
        if genuine_start && start == self.start {
            if end == self.end {
                state.current_offset = Some(end);
                return Some(MatchResult::single(id, true));
            }
            state.waiting_for_end = true;
            if end < self.end {
                state.current_offset = Some(end);
                return Some(MatchResult::single(id, false));
            }
            // Runs past the end: locate the end boundary inside.
            state.current_offset = Some(self.doc.content_start(id).unwrap_or(start));
        } else if start > self.start && end <= self.end {
            state.current_offset = Some(end);
            return Some(MatchResult::single(id, end == self.end));
        }

        if opaque {
            state.current_offset = Some(end);
            if end >= self.end {
                state.waiting_for_end = false;
            }
            return Some(MatchResult::single(id, state.reached(self.end)));
        }

        // Children cannot cover a start that lies in this element's opening
        // markup.
        let starts_in_markup = genuine_start
            && start < self.start
            && self
                .doc
                .content_start(id)
                .is_some_and(|content| self.start < content);
        if starts_in_markup {
            return Some(self.take_whole(id, end, state));
        }

        match self.match_children(id, state) {
            Some(result) => Some(result),
            // Overlaps the target with nothing matched inside, e.g. a start in
            // the closing markup.
            None if genuine_start => Some(self.take_whole(id, end, state)),
            None => None,
        }
    }

    fn take_whole(&self, id: NodeId, end: usize, state: &mut MatchState) -> MatchResult {
        state.current_offset = Some(end);
        state.waiting_for_end = end < self.end;
        MatchResult::single(id, !state.waiting_for_end)
    }

    fn match_children(&self, id: NodeId, state: &mut MatchState) -> Option<MatchResult> {
        let doc = self.doc;
        let child_count = doc.children(id).len();

        let mut nodes: Vec<NodeId> = Vec::new();
        let mut preceding: Vec<NodeId> = Vec::new();
        let mut absorbed = 0usize;
        let mut done = false;
        // Source position just past the last child known to end before the target
        let mut position = doc.content_start(id);

        let mut cursor = doc.children(id).first().copied();
        while let Some(child) = cursor {
            let was_waiting = state.waiting_for_end;
            let opaque = doc.marker(child).is_opaque();
            cursor = if opaque {
                skip_encapsulated(doc, child)
            } else {
                doc.next_sibling(child)
            };

            if doc.is_element(child) {
                let had_offset = state.current_offset.is_some();
                let child_span = doc.span(child);

                match self.match_node(child, child_span, state) {
                    Some(result) => {
                        let matched = if opaque {
                            encapsulated_group(doc, child)
                        } else {
                            result.nodes
                        };
                        if opaque || matched.as_slice() == [child] {
                            absorbed += matched.len();
                        }

                        if !had_offset {
                            let first_start = matched
                                .first()
                                .and_then(|&node| doc.span(node))
                                .and_then(|span| span.start);
                            if let Some(first_start) = first_start {
                                let prefix = self.reclaim_preceding(&mut preceding, first_start);
                                absorbed += prefix.len();
                                nodes.extend(prefix);
                            }
                        }

                        let mut level_done = result.done;
                        if let [single] = matched.as_slice() {
                            if let Some(end) = doc.span(*single).and_then(|span| span.end) {
                                if end >= self.end {
                                    level_done = true;
                                    state.waiting_for_end = false;
                                } else {
                                    state.current_offset = Some(end);
                                }
                            }
                        }

                        nodes.extend(matched);
                        if level_done {
                            done = true;
                            break;
                        }
                    }
                    None => {
                        position = match child_span.map(|span| span.resolve(self.source_len)) {
                            Some((_, end)) if end <= self.start => Some(end),
                            _ => None,
                        };
                    }
                }
            } else if let Some(len) = source_length(doc, child) {
                if state.region_open(self.end) {
                    nodes.push(child);
                    absorbed += 1;
                    state.advance(len);
                    if state.current_offset.is_some_and(|offset| offset >= self.end) {
                        state.waiting_for_end = false;
                    }
                } else if state.current_offset.is_none() {
                    match position {
                        Some(pos) if pos + len <= self.start => position = Some(pos + len),
                        Some(pos) if pos >= self.end => position = None,
                        Some(pos) => {
                            // This node holds the target start.
                            nodes.push(child);
                            absorbed += 1;
                            state.current_offset = Some(pos + len);
                            state.waiting_for_end = pos + len < self.end;
                            position = None;
                        }
                        None => preceding.push(child),
                    }
                }
            }

            if was_waiting && !state.waiting_for_end {
                done = true;
                break;
            }
        }

        if nodes.is_empty() {
            return None;
        }

        let done = done || state.reached(self.end);
        if absorbed == child_count {
            Some(MatchResult::single(id, done))
        } else {
            Some(MatchResult { done, nodes })
        }
    }

    /// Take back buffered span-less siblings that sit between the target start
    /// and the first matched node, nearest first, while they fit the gap.
    fn reclaim_preceding(&self, preceding: &mut Vec<NodeId>, first_start: usize) -> Vec<NodeId> {
        let mut gap = first_start.saturating_sub(self.start);
        let mut prefix = Vec::new();
        while gap > 0 {
            let Some(&node) = preceding.last() else {
                break;
            };
            let len = source_length(self.doc, node).unwrap_or(0);
            if len > gap {
                break;
            }
            gap -= len;
            prefix.push(node);
            preceding.pop();
        }
        prefix.reverse();
        prefix
    }
}

/// Find the minimal sibling set under `root` covering `target`.
///
/// Returns `None` when nothing overlaps the target. Unknown target bounds
/// resolve to `0` and `source_len`.
pub fn find_matching_nodes(
    doc: &AnnotatedDocument,
    root: NodeId,
    target: SourceSpan,
    source_len: usize,
) -> Option<Vec<NodeId>> {
    NodeMatcher::new(doc, target, source_len).find(root)
}
