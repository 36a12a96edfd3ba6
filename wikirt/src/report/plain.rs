//! Human-readable report
//!
//! ```text
//! ----------------------------------------
//! Semantic difference (selser):
//!
//! ----
//! old text
//! ++++
//! new text
//! --------------------------------------------------
//! HTML diff:
//!
//! --- old
//! +++ new
//! ...
//! ```
//!
//! followed by a trailer with semantic, syntactic and total counts.

use super::{Outcome, Reporter};
use crate::classify::DiffResult;
use crate::roundtrip::RoundTripReport;
use std::fmt::Write;

const TEST_DIVIDER: &str = "----------------------------------------";
const DIFF_DIVIDER: &str = "--------------------------------------------------";

#[derive(Debug, Clone, Copy, Default)]
pub struct PlainReporter;

impl Reporter for PlainReporter {
    fn name(&self) -> &str {
        "plain"
    }

    fn description(&self) -> &str {
        "Plain text listing of every difference with totals"
    }

    fn render(&self, _prefix: &str, outcome: Outcome<'_>) -> String {
        match outcome {
            Outcome::Completed(report) => render_report(report),
            Outcome::Failed { error, .. } => {
                format!("Parser failure!\n\n{}\n", error.diagnostic())
            }
        }
    }
}

fn render_report(report: &RoundTripReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        render_result(&mut out, result);
    }

    let semantic = report.semantic_count();
    let syntactic = report.syntactic_count();
    // Writing to a String cannot fail.
    let _ = write!(
        out,
        "\n{TEST_DIVIDER}\n\
         Semantic differences : {semantic}\n\
         Syntactic differences: {syntactic}\n\
         {TEST_DIVIDER}\n\
         Total differences    : {}\n\
         {TEST_DIVIDER}\n",
        semantic + syntactic
    );
    out
}

fn render_result(out: &mut String, result: &DiffResult) {
    let label = if result.is_semantic() {
        "Semantic"
    } else {
        "Syntactic"
    };
    let selser = if result.selser { " (selser)" } else { "" };

    out.push_str(TEST_DIVIDER);
    out.push('\n');
    let _ = writeln!(out, "{label} difference{selser}:\n");
    out.push_str(&result.wt_diff);
    out.push('\n');

    if let Some(html_diff) = result.html_diff.as_deref().filter(|_| result.is_semantic()) {
        out.push_str(DIFF_DIVIDER);
        out.push_str("\nHTML diff:\n\n");
        out.push_str(html_diff);
        out.push('\n');
    }
}
