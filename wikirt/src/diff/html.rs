//! HTML difference between two canonical renderings

use similar::TextDiff;

/// Compares two canonical HTML renderings.
///
/// Implementations must be usable from several classifier threads at once.
pub trait HtmlDiffer: Send + Sync {
    /// A human-readable diff, or `None` when the renderings are equivalent.
    fn diff(&self, old: &str, new: &str) -> Option<String>;
}

/// Unified line diff of the two renderings.
#[derive(Debug, Clone, Copy)]
pub struct LineHtmlDiff {
    pub context: usize,
}

impl Default for LineHtmlDiff {
    fn default() -> Self {
        LineHtmlDiff { context: 3 }
    }
}

impl HtmlDiffer for LineHtmlDiff {
    fn diff(&self, old: &str, new: &str) -> Option<String> {
        if old == new {
            return None;
        }
        let diff = TextDiff::from_lines(old, new);
        let rendered = diff
            .unified_diff()
            .context_radius(self.context)
            .header("old", "new")
            .to_string();
        (!rendered.is_empty()).then_some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_renderings_have_no_diff() {
        assert_eq!(LineHtmlDiff::default().diff("<p>\n</p>\n", "<p>\n</p>\n"), None);
    }

    #[test]
    fn changed_line_shows_in_unified_form() {
        let diff = LineHtmlDiff::default()
            .diff("<p>\n  b\n</p>\n", "<p>\n  c\n</p>\n")
            .unwrap();
        assert!(diff.starts_with("--- old\n+++ new\n"));
        assert!(diff.contains("-  b\n"));
        assert!(diff.contains("+  c\n"));
    }
}
