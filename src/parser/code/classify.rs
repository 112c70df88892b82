//! Decides whether a line pulled out of a text control is code or page chrome.
//! Rules are ordered; the first table that matches decides.

/// Page chrome that shows up next to the editor. Any hit rejects the line.
pub const CHROME_PHRASES: &[&str] = &[
    "Discussion Rules",
    "Sort by",
    "Comment",
    "Online",
    "Companies",
    "Topics",
    "Please don't post",
    "Accepted",
    "Submissions",
];

/// Definition, control-flow and import keywords. Any hit accepts the line.
pub const CODE_KEYWORDS: &[&str] = &["class ", "def ", "return ", "if ", "for ", "while ", "import "];

/// Operators, literals and brackets. Any hit accepts the line.
pub const SYNTAX_TOKENS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "==", "!=", "<", ">", "<=", ">=", "and", "or", "not", "True", "False",
    "None", "in ", ":", "[", "]", "{", "}", "(", ")",
];

/// Structural markup openers. Any hit rejects the line. Checked after the
/// syntax tokens, so a code line holding an HTML literal is still kept.
pub const MARKUP_OPENERS: &[&str] = &["<div", "<span", "<button", "<svg"];

/// Which rule decided a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Chrome,
    Keyword,
    Markup,
    Syntax,
    Unknown,
}

impl LineKind {
    pub fn is_code(self) -> bool {
        !matches!(self, LineKind::Chrome | LineKind::Markup)
    }
}

pub fn classify(line: &str) -> LineKind {
    if contains_any(line, CHROME_PHRASES) {
        LineKind::Chrome
    } else if contains_any(line, CODE_KEYWORDS) {
        LineKind::Keyword
    } else if contains_any(line, SYNTAX_TOKENS) {
        LineKind::Syntax
    } else if contains_any(line, MARKUP_OPENERS) {
        LineKind::Markup
    } else {
        LineKind::Unknown
    }
}

/// Biased toward inclusion: only chrome and leftover markup are dropped.
pub fn is_code_line(line: &str) -> bool {
    classify(line).is_code()
}

fn contains_any(line: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| line.contains(needle))
}
