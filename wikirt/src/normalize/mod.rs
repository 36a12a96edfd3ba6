//! Canonical forms used only for comparison
//!
//! - [`wikitext`]: rule-based wikitext normalization
//! - [`html`]: attribute-sorted, metadata-free, one-node-per-line HTML

pub mod html;
pub mod wikitext;

pub use html::{canonical_body, canonical_nodes, normalize_html};
pub use wikitext::normalize_wikitext;
