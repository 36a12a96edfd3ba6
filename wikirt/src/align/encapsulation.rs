//! Skipping encapsulated (opaque) blocks
//!
//! A transclusion, template parameter or extension can expand to several
//! sibling nodes. They share one `about` id and must be treated as a unit.

use crate::dom::{AnnotatedDocument, NodeId};

/// The nodes making up the opaque block that starts at `id`: `id` itself plus
/// every directly following sibling with the same `about` value.
pub fn encapsulated_group(doc: &AnnotatedDocument, id: NodeId) -> Vec<NodeId> {
    let mut group = vec![id];
    let Some(about) = doc.attr(id, "about") else {
        return group;
    };

    let mut next = doc.next_sibling(id);
    while let Some(sibling) = next {
        if doc.attr(sibling, "about") != Some(about) {
            break;
        }
        group.push(sibling);
        next = doc.next_sibling(sibling);
    }
    group
}

/// Where scanning resumes after the opaque block that starts at `id`.
pub fn skip_encapsulated(doc: &AnnotatedDocument, id: NodeId) -> Option<NodeId> {
    let group = encapsulated_group(doc, id);
    group.last().and_then(|&last| doc.next_sibling(last))
}
