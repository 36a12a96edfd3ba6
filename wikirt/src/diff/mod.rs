//! Text and HTML diffing
//!
//! - [`lines`]: wikitext line diff turned into [`OffsetPair`] regions
//! - [`excerpt`]: the `----`/`++++` excerpts reported for a region
//! - [`html`]: the [`HtmlDiffer`] seam and its unified-diff implementation

pub mod excerpt;
pub mod html;
pub mod lines;

pub use excerpt::{excerpt, WIDE_CONTEXT};
pub use html::{HtmlDiffer, LineHtmlDiff};
pub use lines::{diff_offsets, OffsetPair};
