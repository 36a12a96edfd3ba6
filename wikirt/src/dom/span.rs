//! Typed views of per-node source metadata
//!
//! Elements produced by the parser carry a `data-parsoid` JSON attribute whose
//! `dsr` array starts with the `[start, end)` character offsets of the markup
//! that produced the element, and a `typeof` attribute marking encapsulated
//! content. Both are decoded once, when the document is built.

use crate::error::DataFormatError;
use serde::Deserialize;

/// A half-open `[start, end)` character range into the source text.
///
/// Either bound may be unknown; unknown bounds resolve to the start/end of
/// the document via [`SourceSpan::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SourceSpan {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// A span with both bounds unknown.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Concrete bounds, defaulting missing ones to `0` and `source_len`.
    pub fn resolve(&self, source_len: usize) -> (usize, usize) {
        (self.start.unwrap_or(0), self.end.unwrap_or(source_len))
    }

    /// Length of a fully known span, `0` otherwise.
    pub fn len(&self) -> usize {
        match (self.start, self.end) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slice `text` by this span's character offsets, clamped to the text.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let char_len = text.chars().count();
        let (start, end) = self.resolve(char_len);
        slice_chars(text, start, end)
    }
}

/// Slice by character offsets, clamping out-of-range bounds.
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |offset: usize| {
        text.char_indices()
            .nth(offset)
            .map(|(idx, _)| idx)
            .unwrap_or(text.len())
    };
    let start_byte = byte_at(start);
    let end_byte = byte_at(end.max(start));
    &text[start_byte..end_byte]
}

/// How a node takes part in traversal.
///
/// Everything other than `None` is an opaque block that must be taken (or
/// skipped) whole.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EncapsulationMarker {
    Transclusion,
    Param,
    Extension(String),
    #[default]
    None,
}

impl EncapsulationMarker {
    /// Classify a node from its whitespace-separated `typeof` tokens.
    pub fn from_typeof(value: &str) -> Self {
        for token in value.split_whitespace() {
            match token {
                "mw:Transclusion" => return EncapsulationMarker::Transclusion,
                "mw:Param" => return EncapsulationMarker::Param,
                _ => {
                    if let Some(name) = token.strip_prefix("mw:Extension/") {
                        if !name.is_empty() {
                            return EncapsulationMarker::Extension(name.to_string());
                        }
                    }
                }
            }
        }
        EncapsulationMarker::None
    }

    pub fn is_opaque(&self) -> bool {
        !matches!(self, EncapsulationMarker::None)
    }
}

#[derive(Debug, Deserialize)]
struct RawDataParsoid {
    #[serde(default)]
    dsr: Option<Vec<Option<u64>>>,
    #[serde(default)]
    fostered: Option<bool>,
}

/// The subset of `data-parsoid` the alignment engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeMetadata {
    pub span: Option<SourceSpan>,
    /// Width of the opening markup (third `dsr` entry), when known
    pub open_width: Option<usize>,
    pub fostered: bool,
}

impl NodeMetadata {
    /// Decode a `data-parsoid` attribute value.
    ///
    /// A missing or empty `dsr` yields `span: None`. The closing-tag width
    /// (fourth entry) is not needed and is ignored.
    pub fn from_data_parsoid(raw: &str) -> Result<Self, DataFormatError> {
        let parsed: RawDataParsoid = serde_json::from_str(raw)
            .map_err(|e| DataFormatError::InvalidJson(e.to_string()))?;

        let open_width = parsed
            .dsr
            .as_ref()
            .and_then(|dsr| dsr.get(2).copied().flatten())
            .map(|v| v as usize);

        let span = match parsed.dsr {
            Some(dsr) if !dsr.is_empty() => {
                let start = dsr.first().copied().flatten().map(|v| v as usize);
                let end = dsr.get(1).copied().flatten().map(|v| v as usize);
                if let (Some(start), Some(end)) = (start, end) {
                    if end < start {
                        return Err(DataFormatError::InvertedRange { start, end });
                    }
                }
                Some(SourceSpan { start, end })
            }
            _ => None,
        };

        Ok(NodeMetadata {
            span,
            open_width: open_width.filter(|_| span.is_some()),
            fostered: parsed.fostered.unwrap_or(false),
        })
    }
}
