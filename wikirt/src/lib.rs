//! Round-trip checking for wikitext and annotated HTML
//!
//!     Parsing wikitext to HTML and serializing it back should give back the text we started
//!     with, or at least text that renders the same. This crate finds out, for one page at a
//!     time, which regions of the text changed in the round trip and whether each change matters.
//!
//!     This is a pure lib: it powers wikirt-cli but makes no assumption about a shell, so no
//!     printing, env vars or process exits in here.
//!
//! Architecture
//!
//!     The parser and serializer live in a remote service and are consumed through traits
//!     (./service/mod.rs). What this crate owns is the work between service calls: mapping
//!     changed source ranges back onto the HTML, and deciding whether those bits of HTML differ.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── dom                     # Annotated document: arena DOM + typed source spans
//!     ├── align                   # Source range -> DOM nodes
//!     │   ├── length.rs           # Source length of span-less text/comments
//!     │   ├── encapsulation.rs    # Transclusions/extensions as atomic units
//!     │   └── matcher.rs          # The Node Matcher
//!     ├── normalize               # Canonical wikitext and HTML, for comparison only
//!     ├── diff                    # Line diff -> offset pairs, excerpts, HTML diff
//!     ├── classify.rs             # Syntactic vs semantic verdict per region
//!     ├── roundtrip.rs            # fetch -> parse -> serialize -> diff -> selser pipeline
//!     ├── service                 # Fetch/parse/serialize traits + HTTP client
//!     └── report                  # Plain and XML reporters + registry
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # aggregates the modules below
//!     ├── common/mod.rs           # in-memory fake service
//!     └── <area>/mod.rs
//!
//!     Rust does not discover tests in subdirectories by default, so they are included as modules
//!     of tests/lib.rs.
//!
//! Core Algorithm
//!
//!     Every element produced by the parser carries a `dsr` source range in its `data-parsoid`
//!     attribute. Text and comment nodes do not. Given a changed range of the source, the Node
//!     Matcher (./align/matcher.rs) walks the document and returns the smallest run of sibling
//!     nodes covering it: elements by their ranges, text and comments by counting characters
//!     from the nearest element whose position is known. Transclusions and extension output are
//!     opaque and taken whole.
//!
//!     The Classifier (./classify.rs) runs the matcher on the old and new documents, renders both
//!     fragments canonically and diffs them. A region is semantic only when the HTML differs and
//!     the normalized wikitext differs as well; renderer noise that the source does not show is
//!     syntactic.

pub mod align;
pub mod classify;
pub mod diff;
pub mod dom;
pub mod error;
pub mod normalize;
pub mod report;
pub mod roundtrip;
pub mod service;

pub use align::find_matching_nodes;
pub use classify::{Classifier, DiffKind, DiffResult, Side};
pub use diff::{HtmlDiffer, LineHtmlDiff, OffsetPair};
pub use dom::{AnnotatedDocument, EncapsulationMarker, NodeId, SourceSpan};
pub use error::{DataFormatError, ReportError, RoundTripError, ServiceError, Stage};
pub use normalize::{normalize_html, normalize_wikitext};
pub use report::{Outcome, Reporter, ReporterRegistry};
pub use roundtrip::{Profile, RoundTrip, RoundTripReport};
pub use service::{HttpService, SerializeMode, ServiceSettings, SourceFetcher, WikitextService};
