//! Canonical forms used for comparison.

use proptest::prelude::*;
use wikirt::{normalize_html, normalize_wikitext};

#[test]
fn test_equivalent_table_markup_normalizes_equal() {
    let tidy = "{|class=wikitable\n|a||b\n|}";
    let loose = "{| class=\"wikitable\"\n| a || b \n|}";
    assert_eq!(normalize_wikitext(tidy), normalize_wikitext(loose));
}

#[test]
fn test_tag_case_and_self_closing_slash() {
    assert_eq!(normalize_wikitext("a<BR />b<Br>"), normalize_wikitext("a<br>b<br>"));
}

#[test]
fn test_different_words_stay_different() {
    assert_ne!(normalize_wikitext("a b"), normalize_wikitext("a c"));
}

#[test]
fn test_html_ignores_parser_metadata_and_attribute_order() {
    let a = r##"<p id="mwAQ" class="x" data-parsoid='{"dsr":[0,3,0,0]}' title="t">a  b</p>"##;
    let b = r##"<p title="t" class="x" about="#mwt2">a b</p>"##;
    assert_eq!(normalize_html(a), normalize_html(b));
}

#[test]
fn test_html_keeps_content_differences() {
    assert_ne!(normalize_html("<p>a <b>b</b></p>"), normalize_html("<p>a <i>b</i></p>"));
}

proptest! {
    #[test]
    fn wikitext_normalization_is_idempotent(text in "[a-zA-Z {}|!\\-<>/=\"\t\n]{0,40}") {
        let once = normalize_wikitext(&text);
        prop_assert_eq!(normalize_wikitext(&once), once.clone());
    }

    #[test]
    fn html_normalization_is_idempotent(words in prop::collection::vec("[a-z]{1,5}", 0..6)) {
        let html = format!("<div><p>{}</p></div>", words.join("  "));
        let once = normalize_html(&html);
        let html_again = format!("<div><p>{}</p></div>", words.join(" "));
        prop_assert_eq!(normalize_html(&html_again), once);
    }
}
