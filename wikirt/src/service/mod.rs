//! Collaborators that produce and transform wikitext
//!
//! The round-trip orchestrator only talks to these traits. [`http`] holds the
//! implementation backed by a MediaWiki action API (source text) and a
//! Parsoid-compatible transform API (parse and serialize).

use crate::error::ServiceError;

pub mod http;

pub use http::{HttpService, ServiceSettings};

/// How HTML is turned back into wikitext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializeMode<'a> {
    /// Generate all markup afresh
    Full,
    /// Reuse the original markup wherever the HTML is unchanged
    Selective {
        original_wikitext: &'a str,
        original_html: &'a str,
    },
}

/// Source of the wikitext to check.
pub trait SourceFetcher {
    fn fetch_wikitext(&self, title: &str) -> Result<String, ServiceError>;
}

/// Parser and serializer between wikitext and annotated HTML.
pub trait WikitextService {
    /// Wikitext to HTML whose elements carry `data-parsoid` source ranges.
    fn parse(&self, title: &str, wikitext: &str) -> Result<String, ServiceError>;

    fn serialize(
        &self,
        title: &str,
        html: &str,
        mode: SerializeMode<'_>,
    ) -> Result<String, ServiceError>;
}
