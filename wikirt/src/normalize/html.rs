//! Canonical HTML rendering for comparison
//!
//! Renders nodes one per line, indented two spaces per level, with
//! attributes sorted and round-trip bookkeeping removed. Two fragments that
//! differ only in attribute order, whitespace layout or parser metadata
//! render identically, so a line diff of the renderings shows only changes a
//! reader would see.
//!
//! Removed bookkeeping: `data-parsoid`, `data-mw`, `about`, ids starting with
//! `mw`, and `mw:` tokens of `typeof`.

use crate::dom::markup::is_void_element;
use crate::dom::{AnnotatedDocument, NodeId, NodeKind};

const INDENT: &str = "  ";

/// Canonical rendering of a whole HTML document's body.
pub fn normalize_html(html: &str) -> String {
    let doc = AnnotatedDocument::parse(html);
    canonical_body(&doc)
}

/// Canonical rendering of the children of `doc`'s body.
pub fn canonical_body(doc: &AnnotatedDocument) -> String {
    canonical_nodes(doc, doc.children(doc.body()))
}

/// Canonical rendering of `nodes` and their subtrees.
pub fn canonical_nodes(doc: &AnnotatedDocument, nodes: &[NodeId]) -> String {
    let mut out = String::new();
    for &id in nodes {
        render(doc, id, 0, &mut out);
    }
    out
}

fn render(doc: &AnnotatedDocument, id: NodeId, depth: usize, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document => {
            for &child in doc.children(id) {
                render(doc, child, depth, out);
            }
        }
        NodeKind::Text(text) => {
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                push_line(out, depth, &html_escape::encode_text(&collapsed));
            }
        }
        NodeKind::Comment(body) => {
            push_line(out, depth, &format!("<!--{body}-->"));
        }
        NodeKind::Element { name, attrs } => {
            let mut open = format!("<{name}");
            for (attr, value) in canonical_attrs(attrs) {
                open.push(' ');
                open.push_str(&attr);
                open.push_str("=\"");
                open.push_str(&html_escape::encode_double_quoted_attribute(&value));
                open.push('"');
            }
            open.push('>');
            push_line(out, depth, &open);

            if is_void_element(name) {
                return;
            }
            for &child in doc.children(id) {
                render(doc, child, depth + 1, out);
            }
            push_line(out, depth, &format!("</{name}>"));
        }
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(line);
    out.push('\n');
}

fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

fn canonical_attrs(attrs: &[(String, String)]) -> Vec<(String, String)> {
    let mut kept: Vec<(String, String)> = attrs
        .iter()
        .filter_map(|(name, value)| match name.as_str() {
            "data-parsoid" | "data-mw" | "about" => None,
            "id" if value.starts_with("mw") => None,
            "typeof" => {
                let tokens: Vec<&str> = value
                    .split_whitespace()
                    .filter(|token| !token.starts_with("mw:"))
                    .collect();
                (!tokens.is_empty()).then(|| (name.clone(), tokens.join(" ")))
            }
            _ => Some((name.clone(), value.clone())),
        })
        .collect();
    kept.sort();
    kept
}
