//! Annotated document - arena DOM with typed source metadata
//!
//! The HTML is parsed with `html5ever` into an `RcDom`, then frozen into an
//! arena of [`DomNode`]s indexed by [`NodeId`]. The arena is immutable and
//! `Sync`, so one document can be shared by concurrent matcher calls, which
//! the reference-counted `RcDom` handles cannot be.

use super::span::{EncapsulationMarker, NodeMetadata, SourceSpan};
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Index of a node in its document's arena.
pub type NodeId = usize;

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

/// A node in the arena.
#[derive(Debug, Clone)]
pub struct DomNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// Decoded `dsr` range; `None` when the element carries no usable metadata
    pub span: Option<SourceSpan>,
    /// Width of the opening tag's markup in the source, when known
    pub open_width: Option<usize>,
    pub marker: EncapsulationMarker,
}

impl DomNode {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        DomNode {
            kind,
            parent,
            children: Vec::new(),
            next_sibling: None,
            span: None,
            open_width: None,
            marker: EncapsulationMarker::None,
        }
    }
}

/// An immutable HTML document whose elements carry typed source spans.
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    nodes: Vec<DomNode>,
    body: NodeId,
    fostered: bool,
}

impl AnnotatedDocument {
    /// Parse an HTML document (or fragment; html5ever supplies the missing
    /// `html`/`body` wrappers).
    ///
    /// Never fails: malformed `data-parsoid` values are logged and the node is
    /// treated as having no span.
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        Self::from_rcdom(&dom)
    }

    /// Freeze an already-parsed `RcDom`.
    pub fn from_rcdom(dom: &RcDom) -> Self {
        let mut builder = Builder {
            nodes: Vec::new(),
            body: None,
            fostered: false,
        };
        builder.freeze(&dom.document, None);

        AnnotatedDocument {
            body: builder.body.unwrap_or(0),
            nodes: builder.nodes,
            fostered: builder.fostered,
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        0
    }

    /// The `<body>` element, or the document node when there is none.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Whether any node was moved out of a table by foster parenting.
    pub fn is_fostered(&self) -> bool {
        self.fostered
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &DomNode {
        &self.nodes[id]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].next_sibling
    }

    pub fn span(&self, id: NodeId) -> Option<SourceSpan> {
        self.nodes[id].span
    }

    /// Source offset where the node's content starts (after its opening
    /// markup). Needs both a genuine start and a known opening width.
    pub fn content_start(&self, id: NodeId) -> Option<usize> {
        let node = &self.nodes[id];
        let start = node.span?.start?;
        Some(start + node.open_width?)
    }

    pub fn marker(&self, id: NodeId) -> &EncapsulationMarker {
        &self.nodes[id].marker
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Element { .. })
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(name, _)| name == attr_name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// First element with the given tag name, in document order.
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        (0..self.nodes.len()).find(|&id| self.tag_name(id) == Some(tag))
    }
}

struct Builder {
    nodes: Vec<DomNode>,
    body: Option<NodeId>,
    fostered: bool,
}

impl Builder {
    fn freeze(&mut self, handle: &Handle, parent: Option<NodeId>) -> Option<NodeId> {
        let node = match &handle.data {
            NodeData::Document => DomNode::new(NodeKind::Document, parent),
            NodeData::Text { contents } => {
                DomNode::new(NodeKind::Text(contents.borrow().to_string()), parent)
            }
            NodeData::Comment { contents } => {
                DomNode::new(NodeKind::Comment(contents.to_string()), parent)
            }
            NodeData::Element { name, attrs, .. } => {
                let attrs: Vec<(String, String)> = attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                    .collect();
                let tag = name.local.to_string();
                let mut node = DomNode::new(NodeKind::Element { name: tag, attrs }, parent);
                self.decode_metadata(&mut node);
                node
            }
            NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => return None,
        };

        let id = self.nodes.len();
        let is_body = matches!(&node.kind, NodeKind::Element { name, .. } if name == "body");
        self.nodes.push(node);
        if is_body && self.body.is_none() {
            self.body = Some(id);
        }

        let mut previous: Option<NodeId> = None;
        for child in handle.children.borrow().iter() {
            if let Some(child_id) = self.freeze(child, Some(id)) {
                if let Some(prev) = previous {
                    self.nodes[prev].next_sibling = Some(child_id);
                }
                self.nodes[id].children.push(child_id);
                previous = Some(child_id);
            }
        }

        Some(id)
    }

    fn decode_metadata(&mut self, node: &mut DomNode) {
        let NodeKind::Element { name, attrs } = &node.kind else {
            return;
        };

        let mut span = None;
        let mut open_width = None;
        let mut marker = EncapsulationMarker::None;
        for (attr_name, value) in attrs {
            match attr_name.as_str() {
                "data-parsoid" => match NodeMetadata::from_data_parsoid(value) {
                    Ok(meta) => {
                        span = meta.span;
                        open_width = meta.open_width;
                        self.fostered |= meta.fostered;
                    }
                    Err(err) => {
                        tracing::warn!(element = %name, error = %err, "ignoring malformed source metadata");
                    }
                },
                "typeof" => marker = EncapsulationMarker::from_typeof(value),
                _ => {}
            }
        }

        node.span = span;
        node.open_width = open_width;
        node.marker = marker;
    }
}
