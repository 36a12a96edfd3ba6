//! Wikitext canonicalization for comparison
//!
//! Two wikitext excerpts that differ only in ways the renderer ignores (tag
//! case, spaces inside table markup, quoting of attribute values, a dangling
//! `</small>`) normalize to the same string. The result is only ever compared,
//! never written back.
//!
//! Rules, applied in order:
//!
//! 1. a tab at the start of a line becomes a space
//! 2. runs of spaces collapse to one
//! 3. tag names are lower-cased; one space before `>` and a self-closing `/`
//!    are dropped
//! 4. spaces around leading table and cell tokens (`{|`, `|`, `|-`, `|+`, `!`,
//!    `||`, `!!`) are dropped
//! 5. whitespace and trailing semicolons inside `style="..."` are dropped
//! 6. double quotes are dropped
//! 7. a `</small>` or `</center>` closing a cell or the document is dropped
//!
//! One pass can expose new matches for an earlier rule (dropping a quote can
//! join two runs of spaces), so the pass repeats until nothing changes. Every
//! pass that changes the text shortens it or removes a leading tab or an
//! upper-case tag letter, so the loop ends.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static LEADING_TAB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\t").expect("valid regex for leading tabs"));

static SPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" {2,}").expect("valid regex for space runs"));

static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([^ >/]+)([^>]*?)/?>").expect("valid regex for tag-like tokens")
});

static STYLE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"style\s*=\s*"[^"]+""#).expect("valid regex for style attributes")
});

static CLOSING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(^|\n)</(?:small|center)>(\n[|!]|\n?$)")
        .expect("valid regex for stray closing tags on their own line")
});

static CLOSING_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([|!][^\n]*?)</(?:small|center)>(\n[|!]|\n?$)")
        .expect("valid regex for stray closing tags after cell content")
});

/// Canonical form of `text` for equality comparison.
pub fn normalize_wikitext(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = normalize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_pass(text: &str) -> String {
    let text = LEADING_TAB.replace_all(text, " ");
    let text = SPACE_RUN.replace_all(&text, " ");
    let text = TAG.replace_all(&text, |caps: &Captures| {
        let rest = &caps[3];
        format!(
            "<{}{}{}>",
            &caps[1],
            caps[2].to_lowercase(),
            rest.strip_suffix(' ').unwrap_or(rest)
        )
    });
    let text = collapse_table_tokens(&text);
    let text = STYLE_ATTR.replace_all(&text, |caps: &Captures| {
        let compact: String = caps[0].chars().filter(|c| !c.is_whitespace()).collect();
        match compact.strip_suffix('"') {
            Some(body) => format!("{}\"", body.trim_end_matches(';')),
            None => compact,
        }
    });
    let text = text.replace('"', "");
    let text = CLOSING_LINE.replace_all(&text, "${1}${2}");
    CLOSING_CELL.replace_all(&text, "${1}${2}").into_owned()
}

/// Drop spaces between a leading table/cell token and its content, and
/// before the next cell separator or line end.
///
/// A token is recognised at the start of the text, after a newline, or as the
/// second character of `||`/`!!`.
fn collapse_table_tokens(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        match table_token_at(&chars, i) {
            Some((prefix_len, token_len)) => {
                let token_end = i + prefix_len + token_len;
                out.extend(&chars[i..token_end]);

                let mut content_start = token_end;
                while chars.get(content_start) == Some(&' ') {
                    content_start += 1;
                }
                let mut content_end = content_start;
                while content_end < chars.len() && !matches!(chars[content_end], '|' | '\n') {
                    content_end += 1;
                }
                let resume = content_end;
                while content_end > content_start && chars[content_end - 1] == ' ' {
                    content_end -= 1;
                }
                out.extend(&chars[content_start..content_end]);
                i = resume;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

/// `(prefix length, token length)` of a table token starting at `i`.
fn table_token_at(chars: &[char], i: usize) -> Option<(usize, usize)> {
    if i == 0 {
        if let Some(len) = token_len(chars, 0) {
            return Some((0, len));
        }
    }
    let prefixed = match (chars.get(i), chars.get(i + 1)) {
        (Some('\n'), _) => true,
        (Some('|'), Some('|')) | (Some('!'), Some('!')) => true,
        _ => false,
    };
    if prefixed {
        return token_len(chars, i + 1).map(|len| (1, len));
    }
    None
}

fn token_len(chars: &[char], at: usize) -> Option<usize> {
    match (chars.get(at), chars.get(at + 1)) {
        (Some('{'), Some('|')) => Some(2),
        (Some('|'), _) => {
            let dashes = chars[at + 1..]
                .iter()
                .take_while(|c| matches!(c, '-' | '+'))
                .count();
            Some(1 + dashes)
        }
        (Some('!'), _) => Some(1),
        _ => None,
    }
}
