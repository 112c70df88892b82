use std::sync::LazyLock;

use regex::Regex;

use super::markup::{decode_entities, meta_description, split_meta_description};
use crate::diagnostics::{Diagnostics, Stage};

static NEXT_HEAD_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<title\s+data-next-head[^>]*>\s*(.*?)\s*-\s*LeetCode\s*</title>").unwrap()
});
static PLAIN_TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title>\s*(.*?)\s*-\s*LeetCode\s*</title>").unwrap());

type TitleStrategy = fn(&str) -> Option<String>;

const STRATEGIES: &[(&str, TitleStrategy)] = &[
    ("next-head title", next_head_title),
    ("plain title", plain_title),
    ("meta description", meta_title),
];

/// Problem title, or an empty string when no known markup carries one.
pub fn extract(html: &str, diag: &dyn Diagnostics) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(title) = strategy(html).filter(|t| !t.is_empty()) {
            diag.record(Stage::Title, &format!("{name}: {title}"));
            return title;
        }
    }
    diag.record(Stage::Title, "no title found");
    String::new()
}

fn next_head_title(html: &str) -> Option<String> {
    NEXT_HEAD_TITLE_RE
        .captures(html)
        .map(|caps| decode_entities(caps[1].trim()))
}

fn plain_title(html: &str) -> Option<String> {
    PLAIN_TITLE_RE
        .captures(html)
        .map(|caps| decode_entities(caps[1].trim()))
}

fn meta_title(html: &str) -> Option<String> {
    let decoded = decode_entities(meta_description(html)?);
    let first_line = decoded.lines().next()?;
    let (title, _) = split_meta_description(first_line);
    title.map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Silent;

    #[test]
    fn newer_generation_title() {
        let html = r#"<head><title data-next-head="">Container With Most Water - LeetCode</title></head>"#;
        assert_eq!(extract(html, &Silent), "Container With Most Water");
    }

    #[test]
    fn older_generation_title() {
        let html = "<title>Best Time to Buy and Sell Stock II - LeetCode</title>";
        assert_eq!(extract(html, &Silent), "Best Time to Buy and Sell Stock II");
    }

    #[test]
    fn title_entities_decoded() {
        let html = "<title>Pascal&#x27;s Triangle - LeetCode</title>";
        assert_eq!(extract(html, &Silent), "Pascal's Triangle");
    }

    #[test]
    fn falls_back_to_meta_description() {
        let html = r#"<title>Loading...</title><meta name="description" content="Can you solve this real interview question? Two Sum - Given an array of integers nums"/>"#;
        assert_eq!(extract(html, &Silent), "Two Sum");
    }

    #[test]
    fn missing_title_is_empty() {
        assert_eq!(extract("<html><body></body></html>", &Silent), "");
    }
}
