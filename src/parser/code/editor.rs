//! Reconstruction from the virtualised editor surface, where each visible row is
//! an absolutely positioned `div.view-line` holding syntax-highlighting spans.

use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::parser::markup::nbsp_to_space;

/// A vertical gap larger than this between two rows means blank lines were elided.
pub const BLANK_LINE_GAP_PX: u32 = 20;

static TOP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"top:\s*(\d+)px").unwrap());
static RETURN_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*return\s+\w+").unwrap());

static SURFACE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "div.view-lines.monaco-mouse-cursor-text",
        "div.view-lines",
        "div.monaco-scrollable-element",
    ]
    .into_iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});
static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.view-line").unwrap());
static HIGHLIGHT_SPAN_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"span[class^="mtk"]"#).unwrap());

/// Keywords that open a new statement when row structure is gone.
const STATEMENT_KEYWORDS: &[&str] = &["def", "class", "return", "if", "for", "while"];

/// One rendered editor row. `position` is the row's pixel offset and only
/// serves as a sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    pub text: String,
    pub position: u32,
}

pub fn find_surface(document: &Html) -> Option<ElementRef<'_>> {
    SURFACE_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())
}

/// Rows that carry a `top:` offset and some visible text.
pub fn extract_rows(surface: ElementRef<'_>) -> Vec<CodeLine> {
    surface
        .select(&ROW_SELECTOR)
        .filter_map(|row| {
            let position = row_position(row)?;
            let text = row_text(row);
            if text.trim().is_empty() {
                return None;
            }
            Some(CodeLine { text, position })
        })
        .collect()
}

fn row_position(row: ElementRef<'_>) -> Option<u32> {
    let style = row.value().attr("style")?;
    TOP_RE.captures(style)?.get(1)?.as_str().parse().ok()
}

/// Concatenated span text of one row, NBSP turned into plain spaces.
fn row_text(row: ElementRef<'_>) -> String {
    let raw: String = row.text().collect();
    nbsp_to_space(&raw).trim_end().to_string()
}

/// Stable-sort rows by position and re-insert one blank line wherever the gap to
/// the previous row exceeds [`BLANK_LINE_GAP_PX`].
pub fn assemble(rows: Vec<CodeLine>) -> Vec<String> {
    let mut lines = Vec::with_capacity(rows.len());
    let mut previous: Option<u32> = None;
    for row in rows.into_iter().sorted_by_key(|row| row.position) {
        if let Some(prev) = previous {
            if row.position.saturating_sub(prev) > BLANK_LINE_GAP_PX {
                lines.push(String::new());
            }
        }
        previous = Some(row.position);
        lines.push(row.text);
    }
    lines
}

/// The last row is sometimes missing from the positioned rows. Look for any
/// row on the surface that reads as a `return` statement.
pub fn find_return_row(surface: ElementRef<'_>) -> Option<String> {
    surface
        .select(&ROW_SELECTOR)
        .map(row_text)
        .find(|text| RETURN_LINE_RE.is_match(text))
}

/// Row-based reconstruction. `None` when there is no surface or no usable row.
pub fn from_rows(html: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    let surface = find_surface(&document)?;
    let rows = extract_rows(surface);
    if rows.is_empty() {
        return None;
    }

    let mut lines = assemble(rows);
    let has_def = lines.iter().any(|l| l.contains("def "));
    let has_return = lines.iter().any(|l| l.contains("return "));
    if has_def && !has_return {
        if let Some(ret) = find_return_row(surface) {
            lines.push(ret);
        }
    }
    Some(lines)
}

/// Span-based reconstruction for surfaces that lost their rows: every
/// highlighting span is a token, and statement keywords start new lines.
pub fn from_spans(html: &str) -> Option<Vec<String>> {
    let document = Html::parse_document(html);
    let surface = find_surface(&document)?;
    let tokens: Vec<String> = surface
        .select(&HIGHLIGHT_SPAN_SELECTOR)
        .map(|span| nbsp_to_space(&span.text().collect::<String>()))
        .collect();
    if tokens.is_empty() {
        return None;
    }

    let lines: Vec<String> = split_statements(&tokens)
        .into_iter()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.trim().is_empty())
        .collect();
    (!lines.is_empty()).then_some(lines)
}

fn split_statements(tokens: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for token in tokens {
        if opens_statement(token) && !current.trim().is_empty() {
            // Whitespace gathered before the keyword is the new line's indent.
            let indent = current.split_off(current.trim_end().len());
            lines.push(std::mem::replace(&mut current, indent));
        }
        current.push_str(token);
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

fn opens_statement(token: &str) -> bool {
    let trimmed = token.trim_start();
    STATEMENT_KEYWORDS.iter().any(|kw| {
        trimmed
            .strip_prefix(kw)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(top: u32, text: &str) -> String {
        let spans: String = text
            .split_inclusive(' ')
            .map(|piece| format!("<span class=mtk1>{}</span>", piece.replace(' ', "&nbsp;")))
            .collect();
        format!("<div style=top:{top}px;height:20px class=view-line><span>{spans}</span></div>")
    }

    fn surface(rows: &[String]) -> String {
        format!(
            "<div class=\"view-lines monaco-mouse-cursor-text\" role=presentation>{}</div>",
            rows.concat()
        )
    }

    #[test]
    fn rows_follow_position_not_markup_order() {
        let html = surface(&[
            row(48, "        return 1"),
            row(8, "class Solution:"),
            row(28, "    def one(self) -> int:"),
        ]);
        let lines = from_rows(&html).unwrap();
        assert_eq!(
            lines,
            vec!["class Solution:", "    def one(self) -> int:", "        return 1"]
        );
    }

    #[test]
    fn gap_of_twenty_is_contiguous() {
        let lines = assemble(vec![
            CodeLine { text: "a = 1".into(), position: 8 },
            CodeLine { text: "b = 2".into(), position: 28 },
        ]);
        assert_eq!(lines, vec!["a = 1", "b = 2"]);
    }

    #[test]
    fn gap_of_twenty_one_inserts_one_blank() {
        let lines = assemble(vec![
            CodeLine { text: "a = 1".into(), position: 8 },
            CodeLine { text: "b = 2".into(), position: 29 },
        ]);
        assert_eq!(lines, vec!["a = 1", "", "b = 2"]);
    }

    #[test]
    fn large_gap_still_inserts_exactly_one_blank() {
        let lines = assemble(vec![
            CodeLine { text: "a".into(), position: 0 },
            CodeLine { text: "b".into(), position: 200 },
        ]);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn equal_positions_keep_capture_order() {
        let lines = assemble(vec![
            CodeLine { text: "first".into(), position: 8 },
            CodeLine { text: "second".into(), position: 8 },
        ]);
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[test]
    fn empty_rows_are_dropped() {
        let html = surface(&[
            row(8, "x = 1"),
            "<div style=top:28px;height:20px class=view-line><span><span></span></span></div>".to_string(),
            row(48, "y = 2"),
        ]);
        // The dropped row leaves a 40px gap, which reads as one blank line.
        assert_eq!(from_rows(&html).unwrap(), vec!["x = 1", "", "y = 2"]);
    }

    #[test]
    fn recovers_unpositioned_return_row() {
        let html = surface(&[
            row(8, "class Solution:"),
            row(28, "    def f(self):"),
            row(48, "        total = 0"),
            "<div class=view-line><span><span class=mtk13>&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;return</span><span class=mtk1>&nbsp;total</span></span></div>".to_string(),
        ]);
        let lines = from_rows(&html).unwrap();
        assert_eq!(lines.last().map(String::as_str), Some("        return total"));
    }

    #[test]
    fn no_surface_means_no_rows() {
        assert!(from_rows("<div class=editor></div>").is_none());
        assert!(from_spans("<div class=editor></div>").is_none());
    }

    #[test]
    fn span_fallback_splits_on_statement_keywords() {
        let html = "<div class=view-lines>\
            <span class=mtk4>class</span><span class=mtk1>&nbsp;Solution:</span>\
            <span class=mtk1>&nbsp;&nbsp;&nbsp;&nbsp;</span><span class=mtk4>def</span><span class=mtk1>&nbsp;f(self):</span>\
            <span class=mtk1>&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;&nbsp;</span><span class=mtk13>return</span><span class=mtk1>&nbsp;1</span>\
            </div>";
        let lines = from_spans(html).unwrap();
        assert_eq!(lines, vec!["class Solution:", "    def f(self):", "        return 1"]);
    }

    #[test]
    fn keyword_prefix_inside_identifier_does_not_split() {
        assert!(opens_statement("return"));
        assert!(opens_statement("    if x:"));
        assert!(!opens_statement("format"));
        assert!(!opens_statement("classes"));
    }
}
