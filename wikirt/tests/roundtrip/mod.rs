//! End-to-end checks of the round-trip pipeline against the in-memory wiki.

use crate::common::FakeWiki;
use wikirt::error::Stage;
use wikirt::{Classifier, DiffKind, OffsetPair, RoundTrip, RoundTripError, RoundTripReport};

fn run(wiki: &FakeWiki, title: &str) -> Result<RoundTripReport, RoundTripError> {
    let classifier = Classifier::default();
    RoundTrip::new(wiki, wiki, &classifier).run(title)
}

#[test]
fn test_clean_round_trip_has_no_differences() {
    let wiki = FakeWiki::with_page("Foo", "foo");
    let report = run(&wiki, "Foo").unwrap();

    assert!(report.results.is_empty());
    assert_eq!(report.semantic_count(), 0);
    assert_eq!(report.syntactic_count(), 0);
    // Nothing changed, so nothing is reparsed.
    assert_eq!(
        wiki.calls(),
        vec!["fetch", "parse", "serialize:full", "serialize:selective:marked"]
    );
}

#[test]
fn test_whitespace_change_is_syntactic() {
    let mut wiki = FakeWiki::with_page("Foo", "a  b");
    wiki.full = Some("a b".to_string());
    let report = run(&wiki, "Foo").unwrap();

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.kind, DiffKind::Skip);
    assert_eq!(result.offset, OffsetPair::new((0, 4), (0, 3)));
    assert_eq!(result.wt_diff, "----\na  b\n++++\na b");
    assert_eq!(result.html_diff, None);
    assert!(!result.selser);
}

#[test]
fn test_text_change_is_semantic() {
    let mut wiki = FakeWiki::with_page("Foo", "a b");
    wiki.full = Some("a c".to_string());
    let report = run(&wiki, "Foo").unwrap();

    assert_eq!(report.semantic_count(), 1);
    let result = &report.results[0];
    assert_eq!(result.kind, DiffKind::Fail);
    assert_eq!(result.wt_diff, "----\na b\n++++\na c");
    let html_diff = result.html_diff.as_deref().unwrap();
    assert!(html_diff.contains("a b"));
    assert!(html_diff.contains("a c"));
}

#[test]
fn test_semantic_excerpt_carries_context() {
    let mut wiki = FakeWiki::with_page("Foo", "one\ntwo\nthree\n");
    wiki.full = Some("one\n2\nthree\n".to_string());
    let report = run(&wiki, "Foo").unwrap();

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.offset, OffsetPair::new((4, 8), (4, 6)));
    assert_eq!(result.kind, DiffKind::Fail);
    assert_eq!(result.wt_diff, "----\none\ntwo\nthree\n\n++++\none\n2\nthree\n");
}

#[test]
fn test_selective_results_are_tagged() {
    let mut wiki = FakeWiki::with_page("Foo", "a b");
    wiki.selective = Some("a c".to_string());
    let report = run(&wiki, "Foo").unwrap();

    assert_eq!(report.results.len(), 1);
    assert!(report.results[0].selser);
    assert!(report.results[0].is_semantic());
    assert_eq!(
        wiki.calls(),
        vec![
            "fetch",
            "parse",
            "serialize:full",
            "serialize:selective:marked",
            "parse"
        ]
    );
}

#[test]
fn test_full_results_come_before_selective_results() {
    let mut wiki = FakeWiki::with_page("Foo", "a  b");
    wiki.full = Some("a b".to_string());
    wiki.selective = Some("a c".to_string());
    let report = run(&wiki, "Foo").unwrap();

    let flags: Vec<bool> = report.results.iter().map(|r| r.selser).collect();
    assert_eq!(flags, vec![false, true]);
    assert_eq!(report.semantic_count(), 1);
    assert_eq!(report.syntactic_count(), 1);
}

#[test]
fn test_missing_page_fails_at_fetch() {
    let wiki = FakeWiki::with_page("Foo", "foo");
    let err = run(&wiki, "Bar").unwrap_err();

    assert_eq!(err.stage(), Stage::Fetch);
    assert!(err.diagnostic().contains("page is missing"));
    assert_eq!(wiki.calls(), vec!["fetch"]);
}

#[test]
fn test_reparse_failure_aborts_without_results() {
    let mut wiki = FakeWiki::with_page("Foo", "a b");
    wiki.full = Some("a c".to_string());
    wiki.fail_parse_of = Some("a c".to_string());
    let err = run(&wiki, "Foo").unwrap_err();

    assert_eq!(err.stage(), Stage::ReparseSerialized);
    assert_eq!(
        err.to_string(),
        "reparse stage failed for 'Foo'"
    );
    assert_eq!(wiki.calls(), vec!["fetch", "parse", "serialize:full", "parse"]);
}

#[test]
fn test_profile_records_sizes_and_stages() {
    let wiki = FakeWiki::with_page("Foo", "foo");
    let report = run(&wiki, "Foo").unwrap();

    let stats = report.profile.perf_stats();
    let names: Vec<&str> = stats.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names[0], "time:total");
    assert!(names.contains(&"time:fetch"));
    assert!(names.contains(&"time:selser"));
    assert!(stats.contains(&("size:wikitext".to_string(), 3)));
    assert!(names.contains(&"size:htmlraw"));
}

#[test]
fn test_parallel_classification_matches_sequential() {
    let mut wiki = FakeWiki::with_page("Foo", "one\ntwo\nthree\nfour\n");
    wiki.full = Some("one\n2\nthree\n4\n".to_string());

    let sequential = run(&wiki, "Foo").unwrap();
    let classifier = Classifier::default().parallel(true);
    let parallel = RoundTrip::new(&wiki, &wiki, &classifier).run("Foo").unwrap();

    assert_eq!(sequential.results, parallel.results);
    assert_eq!(sequential.results.len(), 2);
}
