//! HTML serialization of arena nodes and body-comment injection

use super::document::{AnnotatedDocument, NodeId, NodeKind};
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Serialize `nodes` (each with its subtree) and concatenate the markup.
pub fn markup(doc: &AnnotatedDocument, nodes: &[NodeId]) -> String {
    let mut out = String::new();
    for &id in nodes {
        write_node(doc, id, false, &mut out);
    }
    out
}

/// Serialize the children of `id` without the node itself.
pub fn inner_markup(doc: &AnnotatedDocument, id: NodeId) -> String {
    markup(doc, doc.children(id))
}

fn write_node(doc: &AnnotatedDocument, id: NodeId, raw_text: bool, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document => {
            for &child in doc.children(id) {
                write_node(doc, child, false, out);
            }
        }
        NodeKind::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                out.push_str(&html_escape::encode_text(text));
            }
        }
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element { name, attrs } => {
            out.push('<');
            out.push_str(name);
            for (attr, value) in attrs {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }
            out.push('>');

            if is_void_element(name) {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.contains(&name.as_str());
            for &child in doc.children(id) {
                write_node(doc, child, raw, out);
            }

            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

/// Parse `html`, append a comment node as the last child of `<body>`, and
/// serialize the whole document again.
pub fn append_body_comment(html: &str, comment: &str) -> Result<String, std::io::Error> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);

    let body = find_body(&dom.document).unwrap_or_else(|| dom.document.clone());
    let comment_node = create_comment(comment);
    comment_node.parent.set(Some(Rc::downgrade(&body)));
    body.children.borrow_mut().push(comment_node);

    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    let serializable = SerializableHandle::from(dom.document.clone());
    serialize(&mut output, &serializable, opts)?;

    String::from_utf8(output).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn find_body(handle: &Handle) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == "body" {
            return Some(handle.clone());
        }
    }
    handle.children.borrow().iter().find_map(find_body)
}

fn create_comment(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Comment {
            contents: text.to_string().into(),
        },
    })
}
