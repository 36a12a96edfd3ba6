//! Source-length accounting for span-less nodes
//!
//! Text and comment nodes carry no `dsr` of their own. When the matcher has to
//! step over them it estimates how many source characters each consumed.
//!
//! - Text: the character count of the node's text.
//! - Comment: `<!--` + decoded body + `-->`. The DOM stores comment bodies
//!   with `-`, `>` and `&` entity-escaped (so that `--` and `-->` survive
//!   serialization); the source held the decoded characters, so the body
//!   is entity-decoded before counting.

use crate::dom::{AnnotatedDocument, NodeId, NodeKind};

/// `<!--` plus `-->`.
const COMMENT_DELIMITER_LEN: usize = 7;

/// Source length of a comment whose DOM body is `body`.
pub fn decoded_comment_length(body: &str) -> usize {
    html_escape::decode_html_entities(body).chars().count() + COMMENT_DELIMITER_LEN
}

/// Source length of a text node's contents.
pub fn text_length(text: &str) -> usize {
    text.chars().count()
}

/// Source length contributed by a text or comment node; `None` for any other
/// kind of node.
pub fn source_length(doc: &AnnotatedDocument, id: NodeId) -> Option<usize> {
    match doc.kind(id) {
        NodeKind::Text(text) => Some(text_length(text)),
        NodeKind::Comment(body) => Some(decoded_comment_length(body)),
        _ => None,
    }
}
