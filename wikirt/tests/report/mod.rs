//! Reports rendered from real round-trip outcomes.

use crate::common::FakeWiki;
use wikirt::report::Outcome;
use wikirt::{Classifier, ReporterRegistry, RoundTrip};

#[test]
fn test_plain_report_of_a_semantic_change() {
    let mut wiki = FakeWiki::with_page("Foo", "a b");
    wiki.full = Some("a c".to_string());
    let classifier = Classifier::default();
    let report = RoundTrip::new(&wiki, &wiki, &classifier).run("Foo").unwrap();

    let out = ReporterRegistry::default()
        .render("plain", "enwiki", Outcome::Completed(&report))
        .unwrap();
    assert!(out.starts_with("----------------------------------------\nSemantic difference:\n\n----\na b\n++++\na c\n"));
    assert!(out.contains("HTML diff:"));
    assert!(out.ends_with(
        "Semantic differences : 1\n\
         Syntactic differences: 0\n\
         ----------------------------------------\n\
         Total differences    : 1\n\
         ----------------------------------------\n"
    ));
}

#[test]
fn test_xml_report_of_a_fetch_failure() {
    let wiki = FakeWiki::default();
    let classifier = Classifier::default();
    let error = RoundTrip::new(&wiki, &wiki, &classifier)
        .run("Missing")
        .unwrap_err();

    let out = ReporterRegistry::default()
        .render(
            "xml",
            "enwiki",
            Outcome::Failed {
                title: "Missing",
                error: &error,
            },
        )
        .unwrap();
    assert!(out.contains(r#"<testsuite name="Roundtrip article enwiki:Missing">"#));
    assert!(out.contains("fetch stage failed"));
    assert!(out.contains("page is missing"));
    assert!(out.ends_with("</testsuites>"));
}

#[test]
fn test_xml_report_of_a_clean_page_has_only_perfstats() {
    let wiki = FakeWiki::with_page("Foo", "foo");
    let classifier = Classifier::default();
    let report = RoundTrip::new(&wiki, &wiki, &classifier).run("Foo").unwrap();

    let out = ReporterRegistry::default()
        .render("xml", "enwiki", Outcome::Completed(&report))
        .unwrap();
    assert!(!out.contains("<testcase"));
    assert!(out.contains(r#"<perfstat type="size:wikitext">3</perfstat>"#));
}
