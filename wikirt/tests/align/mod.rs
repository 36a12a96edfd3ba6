//! Alignment over documents shaped like real parser output.

use crate::common::annotate;
use proptest::prelude::*;
use std::collections::HashMap;
use wikirt::align::length::source_length;
use wikirt::dom::NodeKind;
use wikirt::{find_matching_nodes, AnnotatedDocument, NodeId, SourceSpan};

fn find(doc: &AnnotatedDocument, target: (usize, usize), source_len: usize) -> Vec<NodeId> {
    find_matching_nodes(
        doc,
        doc.body(),
        SourceSpan::new(target.0, target.1),
        source_len,
    )
    .unwrap_or_default()
}

fn texts(doc: &AnnotatedDocument, nodes: &[NodeId]) -> Vec<String> {
    nodes
        .iter()
        .map(|&id| match doc.kind(id) {
            NodeKind::Text(text) => text.clone(),
            NodeKind::Comment(text) => format!("<!--{text}-->"),
            _ => doc.tag_name(id).unwrap_or_default().to_string(),
        })
        .collect()
}

// Source: "Intro {{Infobox|x}} text\n<!-- note -->\nLast line"
const TRANSCLUSION: &str = concat!(
    "<body>",
    r#"<p data-parsoid='{"dsr":[0,24,0,0]}'>Intro "#,
    r##"<span about="#mwt1" typeof="mw:Transclusion" data-parsoid='{"dsr":[6,19,null,null]}'>Box</span>"##,
    r##"<span about="#mwt1">part two</span>"##,
    " text</p>\n",
    "<!-- note -->\n",
    r#"<p data-parsoid='{"dsr":[39,48,0,0]}'>Last line</p>"#,
    "</body>",
);
const TRANSCLUSION_LEN: usize = 48;

#[test]
fn test_paragraph_by_exact_range() {
    let doc = AnnotatedDocument::parse(&annotate("first\nsecond\nthird"));
    let nodes = find(&doc, (6, 12), 18);
    assert_eq!(texts(&doc, &nodes), vec!["p"]);
    assert_eq!(doc.span(nodes[0]), Some(SourceSpan::new(6, 12)));
}

#[test]
fn test_range_across_paragraphs_returns_the_run() {
    let doc = AnnotatedDocument::parse(&annotate("first\nsecond\nthird"));
    let nodes = find(&doc, (0, 12), 18);
    let spans: Vec<_> = nodes.iter().map(|&id| doc.span(id)).collect();
    assert_eq!(
        spans,
        vec![Some(SourceSpan::new(0, 5)), Some(SourceSpan::new(6, 12))]
    );
}

#[test]
fn test_transclusion_group_is_kept_together() {
    let doc = AnnotatedDocument::parse(TRANSCLUSION);
    let nodes = find(&doc, (10, 12), TRANSCLUSION_LEN);
    assert_eq!(texts(&doc, &nodes), vec!["span", "span"]);
    assert_eq!(doc.attr(nodes[1], "about"), Some("#mwt1"));
}

#[test]
fn test_comment_between_paragraphs_is_placed_by_counting() {
    let doc = AnnotatedDocument::parse(TRANSCLUSION);
    // "\n" at 24, the comment at [25,38), "\n" at 38
    let nodes = find(&doc, (25, 38), TRANSCLUSION_LEN);
    assert_eq!(texts(&doc, &nodes), vec!["<!-- note -->"]);
}

#[test]
fn test_unknown_end_runs_to_the_end_of_the_source() {
    let doc = AnnotatedDocument::parse(&annotate("first\nsecond"));
    let target = SourceSpan {
        start: Some(6),
        end: None,
    };
    let nodes = find_matching_nodes(&doc, doc.body(), target, 12).unwrap();
    assert_eq!(doc.span(nodes[0]), Some(SourceSpan::new(6, 12)));
    assert_eq!(nodes.len(), 1);
}

// Source: "<div>\nfoo\n</div>\nbar"
const CLOSING_DIV: &str = concat!(
    r#"<body data-parsoid='{"dsr":[0,20,0,0]}'>"#,
    r#"<div data-parsoid='{"dsr":[0,16,5,6]}'>"#,
    "\nfoo\n</div>\n",
    r#"<p data-parsoid='{"dsr":[17,20,0,0]}'>bar</p></body>"#,
);

// Source: "a ''b'' c\n\nsecond para"
const QUOTED: &str = concat!(
    r#"<body data-parsoid='{"dsr":[0,22,0,0]}'>"#,
    r#"<p data-parsoid='{"dsr":[0,9,0,0]}'>a <i data-parsoid='{"dsr":[2,7,2,2]}'>b</i> c</p>"#,
    "\n\n",
    r#"<p data-parsoid='{"dsr":[11,22,0,0]}'>second para</p></body>"#,
);

/// Record the source range of `id` and of everything beneath it: spans where
/// the node has one, character counts from the previous sibling otherwise.
fn source_ranges(
    doc: &AnnotatedDocument,
    id: NodeId,
    range: (usize, usize),
    source_len: usize,
    ranges: &mut HashMap<NodeId, (usize, usize)>,
) {
    ranges.insert(id, range);
    let mut pos = doc.content_start(id).unwrap_or(range.0);
    for &child in doc.children(id) {
        let child_range = match (doc.span(child), source_length(doc, child)) {
            (Some(span), _) => span.resolve(source_len),
            (None, Some(len)) => (pos, pos + len),
            (None, None) => continue,
        };
        source_ranges(doc, child, child_range, source_len, ranges);
        pos = child_range.1;
    }
}

/// Describe how the matched nodes fail to cover `target` end to end, if
/// they do.
fn coverage_error(
    doc: &AnnotatedDocument,
    target: (usize, usize),
    source_len: usize,
) -> Option<String> {
    let nodes = find(doc, target, source_len);
    let body_range = doc
        .span(doc.body())
        .unwrap_or_else(SourceSpan::unknown)
        .resolve(source_len);
    let mut ranges = HashMap::new();
    source_ranges(doc, doc.body(), body_range, source_len, &mut ranges);

    let mut covered: Option<(usize, usize)> = None;
    let mut total = 0;
    for id in &nodes {
        let Some(&(start, end)) = ranges.get(id) else {
            return Some(format!("node {id} has no known range"));
        };
        total += end - start;
        covered = match covered {
            None => Some((start, end)),
            Some((_, to)) if start > to => {
                return Some(format!("gap [{to},{start}) in {:?}", texts(doc, &nodes)))
            }
            Some((from, to)) => Some((from, to.max(end))),
        };
    }

    match covered {
        None => Some(format!("nothing matched {target:?}")),
        Some((from, to)) if from > target.0 || to < target.1 => Some(format!(
            "[{from},{to}) misses part of {target:?}: {:?}",
            texts(doc, &nodes)
        )),
        Some((from, to)) if total != to - from => {
            Some(format!("nodes overlap: {:?}", texts(doc, &nodes)))
        }
        Some(_) => None,
    }
}

#[test]
fn test_target_starting_in_closing_markup_is_covered() {
    let doc = AnnotatedDocument::parse(CLOSING_DIV);
    assert_eq!(coverage_error(&doc, (10, 20), 20), None);
    assert_eq!(coverage_error(&doc, (12, 17), 20), None);

    let doc = AnnotatedDocument::parse(QUOTED);
    assert_eq!(coverage_error(&doc, (5, 15), 22), None);
    assert_eq!(coverage_error(&doc, (3, 9), 22), None);
}

#[derive(Debug, Clone)]
enum Block {
    Para {
        before: String,
        italic: Option<String>,
        after: String,
    },
    Comment(String),
}

fn block() -> impl Strategy<Value = Block> {
    prop_oneof![
        3 => ("[a-z]{1,5} ", prop::option::of("[a-z]{1,5}"), "( [a-z]{1,5}){0,2}")
            .prop_map(|(before, italic, after)| Block::Para { before, italic, after }),
        1 => "[a-z]{1,5}( [a-z]{1,5})?".prop_map(Block::Comment),
    ]
}

/// Wikitext and annotated HTML for `blocks`, one per line. Lines are joined
/// by "\n" text nodes, comments carry no span, and the body spans everything.
fn render(blocks: &[Block]) -> (String, String) {
    let mut wikitext = String::new();
    let mut body = String::new();
    for (n, block) in blocks.iter().enumerate() {
        if n > 0 {
            wikitext.push('\n');
            body.push('\n');
        }
        let start = wikitext.chars().count();
        match block {
            Block::Comment(text) => {
                wikitext.push_str(&format!("<!--{text}-->"));
                body.push_str(&format!("<!--{text}-->"));
            }
            Block::Para { before, italic, after } => {
                let mut inner = before.clone();
                wikitext.push_str(before);
                if let Some(word) = italic {
                    let italic_start = wikitext.chars().count();
                    wikitext.push_str(&format!("''{word}''"));
                    inner.push_str(&format!(
                        r#"<i data-parsoid='{{"dsr":[{},{},2,2]}}'>{}</i>"#,
                        italic_start,
                        wikitext.chars().count(),
                        word
                    ));
                }
                wikitext.push_str(after);
                inner.push_str(after);
                body.push_str(&format!(
                    r#"<p data-parsoid='{{"dsr":[{},{},0,0]}}'>{}</p>"#,
                    start,
                    wikitext.chars().count(),
                    inner
                ));
            }
        }
    }
    let html = format!(
        r#"<body data-parsoid='{{"dsr":[0,{},0,0]}}'>{}</body>"#,
        wikitext.chars().count(),
        body
    );
    (wikitext, html)
}

fn line() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,6}( [a-z]{1,6}){0,3}").expect("valid strategy regex")
}

proptest! {
    #[test]
    fn matched_elements_overlap_the_target(
        lines in prop::collection::vec(line(), 1..6),
        a in 0usize..200,
        b in 0usize..200,
    ) {
        let wikitext = lines.join("\n");
        let len = wikitext.chars().count();
        let (start, end) = (a.min(b) % len, (a.max(b) % len) + 1);
        prop_assume!(start < end);

        let doc = AnnotatedDocument::parse(&annotate(&wikitext));
        for id in find(&doc, (start, end), len) {
            if let Some(SourceSpan { start: Some(s), end: Some(e) }) = doc.span(id) {
                prop_assert!(s < end && e > start, "[{s},{e}) misses [{start},{end})");
            }
        }
    }

    #[test]
    fn matched_nodes_cover_the_target(
        blocks in prop::collection::vec(block(), 1..6),
        a in 0usize..300,
        b in 0usize..300,
    ) {
        let (wikitext, html) = render(&blocks);
        let len = wikitext.chars().count();
        let (start, end) = (a.min(b) % len, (a.max(b) % len) + 1);
        prop_assume!(start < end);

        let doc = AnnotatedDocument::parse(&html);
        let error = coverage_error(&doc, (start, end), len);
        prop_assert!(error.is_none(), "{:?} in {:?}: {:?}", (start, end), wikitext, error);
    }

    #[test]
    fn exact_line_ranges_find_their_paragraph(
        lines in prop::collection::vec(line(), 1..6),
        pick in 0usize..6,
    ) {
        let wikitext = lines.join("\n");
        let len = wikitext.chars().count();
        let pick = pick % lines.len();
        let start: usize = lines[..pick].iter().map(|l| l.chars().count() + 1).sum();
        let end = start + lines[pick].chars().count();

        let doc = AnnotatedDocument::parse(&annotate(&wikitext));
        let nodes = find(&doc, (start, end), len);
        if lines.len() == 1 {
            prop_assert_eq!(nodes, vec![doc.body()]);
        } else {
            prop_assert_eq!(nodes.len(), 1);
            prop_assert_eq!(doc.span(nodes[0]), Some(SourceSpan::new(start, end)));
        }
    }
}
