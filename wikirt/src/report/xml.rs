//! JUnit-style XML report
//!
//! One `<testsuite>` per run of results with the same selser flag, one
//! `<testcase>` per difference (`<failure>` for semantic, `<skipped>` for
//! syntactic), then the profile as `<perfstats>`. A page that failed to
//! round-trip becomes a single errored test case.

use super::{Outcome, Reporter};
use crate::classify::DiffResult;
use crate::roundtrip::RoundTripReport;
use html_escape::encode_quoted_attribute as escape;

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReporter;

impl Reporter for XmlReporter {
    fn name(&self) -> &str {
        "xml"
    }

    fn description(&self) -> &str {
        "JUnit-style XML with one test case per difference"
    }

    fn render(&self, prefix: &str, outcome: Outcome<'_>) -> String {
        let article = format!("{prefix}:{}", outcome.title());
        let mut out = String::from("<testsuites>\n");
        match outcome {
            Outcome::Completed(report) => render_report(&mut out, &article, report),
            Outcome::Failed { error, .. } => {
                open_suite(&mut out, &article, false);
                out.push_str("<testcase name=\"entire article\"><error type=\"parserFailedToFinish\">");
                out.push_str(&escape(&error.diagnostic()));
                out.push_str("</error></testcase>\n");
                out.push_str("</testsuite>\n");
            }
        }
        out.push_str("</testsuites>");
        out
    }
}

fn open_suite(out: &mut String, article: &str, selser: bool) {
    let suffix = if selser { " (selser)" } else { "" };
    out.push_str(&format!(
        "<testsuite name=\"Roundtrip article {}{}\">\n",
        escape(article),
        suffix
    ));
}

fn render_report(out: &mut String, article: &str, report: &RoundTripReport) {
    let mut selser = report.results.first().is_some_and(|r| r.selser);
    open_suite(out, article, selser);

    for result in &report.results {
        if result.selser != selser {
            selser = result.selser;
            out.push_str("</testsuite>\n");
            open_suite(out, article, selser);
        }
        render_case(out, article, result);
    }
    out.push_str("</testsuite>\n");

    out.push_str("<perfstats>\n");
    for (metric, value) in report.profile.perf_stats() {
        out.push_str(&format!(
            "<perfstat type=\"{}\">{value}</perfstat>\n",
            escape(&metric)
        ));
    }
    out.push_str("</perfstats>\n");
}

fn render_case(out: &mut String, article: &str, result: &DiffResult) {
    out.push_str(&format!(
        "<testcase name=\"{} character {}\">\n",
        escape(article),
        result.offset.old_start()
    ));

    match result.html_diff.as_deref().filter(|_| result.is_semantic()) {
        Some(html_diff) => {
            out.push_str("<failure type=\"significantHtmlDiff\">\n");
            out.push_str("<diff class=\"wt\">\n");
            out.push_str(&escape(&result.wt_diff));
            out.push_str("\n</diff>\n<diff class=\"html\">\n");
            out.push_str(&escape(html_diff));
            out.push_str("\n</diff>\n</failure>\n");
        }
        None => {
            out.push_str("<skipped type=\"insignificantWikitextDiff\">\n");
            out.push_str(&escape(&result.wt_diff));
            out.push_str("\n</skipped>\n");
        }
    }
    out.push_str("</testcase>\n");
}
