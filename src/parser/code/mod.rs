//! Solution code recovery. Strategies run in a fixed order and the first one
//! that yields anything wins; if none does, the result is a sentinel.

pub mod classify;
pub mod editor;

use std::sync::LazyLock;

use regex::Regex;

use super::markup::{decode_entities, strip_tags};
use crate::diagnostics::{Diagnostics, Stage};

/// Returned (with a trailing newline) when no strategy recovers any code.
pub const CODE_EXTRACTION_FAILED: &str = "# leetcard: could not recover the solution code from this page";

static CLASS_BODY_TEXTAREA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<textarea[^>]*>\s*(class\s+Solution.*?return\s+\w+.*?)</textarea>").unwrap()
});
static TEXTAREA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<textarea[^>]*>(.*?)</textarea>").unwrap());
static TOKEN_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<span class="token[^>]*>(.*?)</span>"#).unwrap());
static PRE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").unwrap());
static FUNCTION_DEF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bdef\s+\w+\s*\(").unwrap());
static CLASS_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*class\s+\w+").unwrap());
static METHOD_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*def\s+\w+\s*\(self").unwrap());

type Strategy = fn(&str) -> Option<String>;

/// Ordered from most to least reliable.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("textarea class body", textarea_class_body),
    ("textarea filtered", textarea_filtered),
    ("editor rows", editor_rows),
    ("editor spans", editor_spans),
    ("token spans", token_spans),
    ("pre block", pre_block),
];

/// Reconstructed source ending in exactly one newline. Never empty.
pub fn reconstruct(html: &str, diag: &dyn Diagnostics) -> String {
    for (name, strategy) in STRATEGIES {
        match strategy(html) {
            Some(code) if !code.trim().is_empty() => {
                diag.record(
                    Stage::Code,
                    &format!("{name} matched ({} lines)", code.trim_end().lines().count()),
                );
                return normalize(&code);
            }
            _ => diag.record(Stage::Code, &format!("{name}: nothing found")),
        }
    }
    diag.record(Stage::Code, "every strategy failed, emitting placeholder");
    normalize(CODE_EXTRACTION_FAILED)
}

/// True when `code` is the extraction-failure placeholder.
pub fn is_extraction_failure(code: &str) -> bool {
    code.trim_end() == CODE_EXTRACTION_FAILED
}

fn normalize(code: &str) -> String {
    let body = code.trim_start_matches(['\n', '\r']).trim_end();
    format!("{body}\n")
}

fn textarea_class_body(html: &str) -> Option<String> {
    let body = CLASS_BODY_TEXTAREA_RE.captures(html)?.get(1)?.as_str();
    let decoded = decode_entities(body);
    let lines: Vec<&str> = decoded
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn textarea_filtered(html: &str) -> Option<String> {
    let content = decode_entities(TEXTAREA_RE.captures(html)?.get(1)?.as_str());
    let plausible = content.lines().any(|line| {
        line.contains("class Solution") || (line.contains("def ") && line.contains("(self"))
    });
    if !plausible {
        return None;
    }
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty() && classify::is_code_line(line.trim()))
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn editor_rows(html: &str) -> Option<String> {
    editor::from_rows(html).map(|lines| reorder(&lines))
}

fn editor_spans(html: &str) -> Option<String> {
    editor::from_spans(html).map(|lines| reorder(&lines))
}

fn token_spans(html: &str) -> Option<String> {
    let code: String = TOKEN_SPAN_RE
        .captures_iter(html)
        .map(|caps| decode_entities(&caps[1]))
        .collect();
    (!code.is_empty()).then_some(code)
}

fn pre_block(html: &str) -> Option<String> {
    PRE_RE.captures_iter(html).find_map(|caps| {
        let text = decode_entities(&strip_tags(&caps[1], ""));
        FUNCTION_DEF_RE.is_match(&text).then_some(text)
    })
}

/// Put class lines first, then method signatures, then everything else.
///
/// Captured rows can arrive interleaved. Input is left alone when it lacks a
/// class or a method line, when it has more than one method (hoisting every
/// signature would detach the bodies), or when the class already comes first.
pub fn reorder(lines: &[String]) -> String {
    let first_class = lines.iter().position(|l| CLASS_LINE_RE.is_match(l));
    let first_method = lines.iter().position(|l| METHOD_LINE_RE.is_match(l));
    let method_count = lines.iter().filter(|l| METHOD_LINE_RE.is_match(l)).count();
    match (first_class, first_method) {
        (None, _) | (_, None) => return lines.join("\n"),
        (Some(0), Some(_)) => return lines.join("\n"),
        _ if method_count > 1 => return lines.join("\n"),
        _ => {}
    }

    let mut classes = Vec::new();
    let mut methods = Vec::new();
    let mut body = Vec::new();
    for line in lines {
        if CLASS_LINE_RE.is_match(line) {
            classes.push(line.as_str());
        } else if METHOD_LINE_RE.is_match(line) {
            methods.push(line.as_str());
        } else {
            body.push(line.as_str());
        }
    }
    classes
        .into_iter()
        .chain(methods)
        .chain(body)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::testing::Recorder;
    use crate::diagnostics::Silent;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    const MAX_AREA: &str = "class Solution:
    def maxArea(self, height: List[int]) -> int:
        l = 0
        r = len(height)-1
        maxArea = 0

        while l<r:
            minH = min(height[l], height[r])
            currentArea = minH * (r-l)
            maxArea = max(maxArea, currentArea)

            if height[l] < height[r]:
                l +=1
            else:
                r -=1
        return maxArea
";

    #[test]
    fn editor_surface_with_elided_blank_rows() {
        let recorder = Recorder::default();
        let code = reconstruct(&fixture("editor_max_area"), &recorder);
        assert_eq!(code, MAX_AREA);
        assert!(recorder.contains(Stage::Code, "editor rows matched"));
    }

    #[test]
    fn dense_editor_surface_has_no_blank_lines() {
        let code = reconstruct(&fixture("editor_dense"), &Silent);
        let expected: String = MAX_AREA
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| format!("{l}\n"))
            .collect();
        assert_eq!(code, expected);
        assert!(code.ends_with("maxArea\n"));
        assert!(!code.ends_with("\n\n"));
    }

    #[test]
    fn textarea_class_body_drops_blank_lines() {
        let html = "<textarea class=inputarea>class Solution:\n\n    def maxProfit(self, prices):\n        best = 0\n\n        for p in prices:\n            best = max(best, p)\n        return best\n</textarea>";
        let code = reconstruct(html, &Silent);
        assert_eq!(
            code,
            "class Solution:\n    def maxProfit(self, prices):\n        best = 0\n        for p in prices:\n            best = max(best, p)\n        return best\n"
        );
    }

    #[test]
    fn textarea_entities_are_decoded() {
        let html = "<textarea>class Solution:\n    def f(self, a):\n        return a &lt; 3 and a &gt; 0\n</textarea>";
        assert!(reconstruct(html, &Silent).contains("return a < 3 and a > 0"));
    }

    #[test]
    fn textarea_filter_drops_chrome() {
        let html = "<textarea>def solve(self, xs):\nComments (12)\n    total = sum(xs)\nSubmissions 40K\n    print(total)\n</textarea>";
        let recorder = Recorder::default();
        let code = reconstruct(html, &recorder);
        assert_eq!(code, "def solve(self, xs):\n    total = sum(xs)\n    print(total)\n");
        assert!(recorder.contains(Stage::Code, "textarea filtered matched"));
    }

    #[test]
    fn textarea_filter_keeps_html_literals() {
        let html = "<textarea>def render(self, xs):\n    tag = '<span>'\n    print(tag)\n</textarea>";
        let code = reconstruct(html, &Silent);
        assert_eq!(code, "def render(self, xs):\n    tag = '<span>'\n    print(tag)\n");
    }

    #[test]
    fn textarea_without_code_is_skipped() {
        let html = "<textarea>Write your notes here</textarea>";
        assert!(textarea_filtered(html).is_none());
    }

    #[test]
    fn token_span_fallback() {
        let html = r#"<pre><code><span class="token keyword">def</span> <span class="token function">f</span><span class="token punctuation">(</span><span class="token punctuation">)</span></code></pre>"#;
        assert_eq!(token_spans(html).as_deref(), Some("deff()"));
    }

    #[test]
    fn pre_block_fallback() {
        let html = "<pre>Input: [1,2]</pre><pre><b>def</b> twice(x):\n    return x * 2 &amp;&amp; 1</pre>";
        let code = reconstruct(html, &Silent);
        assert_eq!(code, "def twice(x):\n    return x * 2 && 1\n");
    }

    #[test]
    fn sentinel_when_nothing_matches() {
        let code = reconstruct("<html><body><p>nothing here</p></body></html>", &Silent);
        assert!(is_extraction_failure(&code));
        assert!(code.ends_with('\n'));
        assert!(!code.trim().is_empty());
    }

    #[test]
    fn reorder_moves_class_and_signature_first() {
        let lines: Vec<String> = ["        return x", "    def f(self, x):", "class Solution:"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(reorder(&lines), "class Solution:\n    def f(self, x):\n        return x");
    }

    #[test]
    fn reorder_keeps_ordered_multi_method_classes() {
        let lines: Vec<String> = [
            "class Solution:",
            "    def a(self):",
            "        return 1",
            "    def b(self):",
            "        return 2",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(reorder(&lines), lines.join("\n"));
    }

    #[test]
    fn reorder_keeps_decorated_methods_in_place() {
        let lines: Vec<String> = ["class Solution:", "    @cache", "    def f(self, n):", "        return n"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(reorder(&lines), lines.join("\n"));
    }

    #[test]
    fn reorder_never_flattens_several_methods() {
        let lines: Vec<String> = [
            "        return 1",
            "class Solution:",
            "    def a(self):",
            "    # helper",
            "    def b(self):",
            "        return 2",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(reorder(&lines), lines.join("\n"));
    }

    #[test]
    fn reorder_without_class_is_identity() {
        let lines: Vec<String> = ["x = 1", "    def f(self):"].iter().map(|s| s.to_string()).collect();
        assert_eq!(reorder(&lines), "x = 1\n    def f(self):");
    }
}
