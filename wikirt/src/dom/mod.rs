//! Annotated HTML documents
//!
//! - [`span`]: typed source ranges and encapsulation markers decoded from
//!   per-node metadata
//! - [`document`]: the immutable arena DOM the alignment engine walks
//! - [`markup`]: serialization of arena nodes back to HTML

pub mod document;
pub mod markup;
pub mod span;

pub use document::{AnnotatedDocument, DomNode, NodeId, NodeKind};
pub use span::{EncapsulationMarker, NodeMetadata, SourceSpan};
