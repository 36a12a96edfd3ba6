//! In-memory stand-ins for the wiki and the parse/serialize service.

use std::cell::RefCell;
use std::collections::HashMap;
use wikirt::error::ServiceError;
use wikirt::service::{SerializeMode, SourceFetcher, WikitextService};

pub const MARKER_COMMENT: &str = "<!--rtSelserEditTestComment-->";

/// Render every non-blank line of `wikitext` as a paragraph carrying its
/// character range, the way the real parser annotates block elements.
pub fn annotate(wikitext: &str) -> String {
    let mut html = String::from("<html><head></head><body>");
    let mut offset = 0;
    for line in wikitext.split('\n') {
        let len = line.chars().count();
        if !line.trim().is_empty() {
            html.push_str(&format!(
                r#"<p data-parsoid='{{"dsr":[{},{},0,0]}}'>{}</p>"#,
                offset,
                offset + len,
                html_escape::encode_text(line)
            ));
        }
        offset += len + 1;
    }
    html.push_str("</body></html>");
    html
}

/// A wiki with scripted serializer output.
///
/// `full` and `selective` are what the serializer returns in each mode; when
/// unset it hands back the original text. Selective output gets the edit
/// marker appended whenever the HTML it was given carries one.
#[derive(Default)]
pub struct FakeWiki {
    pages: HashMap<String, String>,
    pub full: Option<String>,
    pub selective: Option<String>,
    /// Parsing exactly this text fails with HTTP 500
    pub fail_parse_of: Option<String>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeWiki {
    pub fn with_page(title: &str, wikitext: &str) -> Self {
        let mut wiki = FakeWiki::default();
        wiki.pages.insert(title.to_string(), wikitext.to_string());
        wiki
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &str) {
        self.calls.borrow_mut().push(call.to_string());
    }

    fn original(&self, title: &str) -> String {
        self.pages.get(title).cloned().unwrap_or_default()
    }
}

impl SourceFetcher for FakeWiki {
    fn fetch_wikitext(&self, title: &str) -> Result<String, ServiceError> {
        self.record("fetch");
        self.pages
            .get(title)
            .cloned()
            .ok_or_else(|| ServiceError::MissingContent {
                title: title.to_string(),
                reason: "page is missing".to_string(),
            })
    }
}

impl WikitextService for FakeWiki {
    fn parse(&self, _title: &str, wikitext: &str) -> Result<String, ServiceError> {
        self.record("parse");
        if self.fail_parse_of.as_deref() == Some(wikitext) {
            return Err(ServiceError::Status {
                url: "http://parsoid.test/transform".to_string(),
                status: 500,
                body: "internal error".to_string(),
            });
        }
        Ok(annotate(wikitext))
    }

    fn serialize(
        &self,
        title: &str,
        html: &str,
        mode: SerializeMode<'_>,
    ) -> Result<String, ServiceError> {
        match mode {
            SerializeMode::Full => {
                self.record("serialize:full");
                Ok(self.full.clone().unwrap_or_else(|| self.original(title)))
            }
            SerializeMode::Selective {
                original_wikitext, ..
            } => {
                let marked = html.contains(MARKER_COMMENT);
                self.record(if marked {
                    "serialize:selective:marked"
                } else {
                    "serialize:selective"
                });
                let mut out = self
                    .selective
                    .clone()
                    .unwrap_or_else(|| original_wikitext.to_string());
                if marked {
                    out.push_str(MARKER_COMMENT);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }
}
