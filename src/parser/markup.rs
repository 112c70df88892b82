//! Regex-level helpers shared by the extractors: entity decoding, tag stripping,
//! and the `<img>` placeholder round trip.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->|</?[a-zA-Z][^>]*>").unwrap());
static IMG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img\b[^>]*>").unwrap());
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__IMG_TAG_(\d+)__").unwrap());
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());
static META_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s[^>]*\bname="description"[^>]*\bcontent="([^"]*)""#).unwrap()
});

/// Boilerplate the site prepends to every meta description.
pub const META_PREAMBLE: &str = "Can you solve this real interview question? ";

/// Decode named and numeric entities in one pass, so `&amp;lt;` becomes `&lt;`.
/// Unknown named entities are left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    ENTITY_RE
        .replace_all(s, |caps: &Captures| {
            let body = &caps[1];
            let decoded = if let Some(num) = body.strip_prefix('#') {
                let value = match num.strip_prefix(['x', 'X']) {
                    Some(hex) => u32::from_str_radix(hex, 16).ok(),
                    None => num.parse::<u32>().ok(),
                };
                value.and_then(char::from_u32)
            } else {
                named_entity(body)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "le" => '≤',
        "ge" => '≥',
        "ne" => '≠',
        "times" => '×',
        "minus" => '−',
        "rarr" => '→',
        "hellip" => '…',
        "ndash" => '–',
        "mdash" => '—',
        _ => return None,
    };
    Some(c)
}

/// The five entities the description cleanup handles, in a fixed order.
/// `&amp;` goes after `&lt;`/`&gt;` so escaped entities survive one level.
pub fn decode_common_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replace every tag (and comment) with `replacement`.
pub fn strip_tags(s: &str, replacement: &str) -> String {
    TAG_RE.replace_all(s, replacement).into_owned()
}

pub fn nbsp_to_space(s: &str) -> String {
    s.replace('\u{a0}', " ")
}

/// Pull every `<img>` tag out of `s`, leaving `__IMG_TAG_<n>__` tokens behind.
pub fn stash_images(s: &str) -> (String, Vec<String>) {
    let mut tags = Vec::new();
    let stashed = IMG_TAG_RE
        .replace_all(s, |caps: &Captures| {
            tags.push(caps[0].to_string());
            format!("__IMG_TAG_{}__", tags.len() - 1)
        })
        .into_owned();
    (stashed, tags)
}

/// Inverse of [`stash_images`]. Tokens with no stashed tag are dropped.
pub fn restore_images(s: &str, tags: &[String]) -> String {
    PLACEHOLDER_RE
        .replace_all(s, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| tags.get(i))
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

pub fn img_tags(s: &str) -> impl Iterator<Item = &str> {
    IMG_TAG_RE.find_iter(s).map(|m| m.as_str())
}

/// Raw (still entity-encoded) content of the page's meta description.
pub fn meta_description(html: &str) -> Option<&str> {
    META_DESCRIPTION_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Split a decoded meta description into `(title, body)` around the first " - ".
pub fn split_meta_description(decoded: &str) -> (Option<&str>, &str) {
    let first = decoded.trim_start();
    let first = first.strip_prefix(META_PREAMBLE).unwrap_or(first);
    match first.split_once(" - ") {
        Some((title, body)) => (Some(title.trim()), body.trim()),
        None => (None, first.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(decode_entities("a&nbsp;&lt;&nbsp;b"), "a < b");
        assert_eq!(decode_entities("it&#39;s &#x27;ok&#x27;"), "it's 'ok'");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&bogus; &"), "&bogus; &");
    }

    #[test]
    fn common_entities_keep_double_escapes() {
        assert_eq!(decode_common_entities("1 &lt;= n&nbsp;&amp;&amp; &quot;x&quot;"), "1 <= n && \"x\"");
        assert_eq!(decode_common_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn strip_tags_ignores_comparisons() {
        assert_eq!(strip_tags("<p>1 <= n <= 10</p>", ""), "1 <= n <= 10");
        assert_eq!(strip_tags("a<!-- x -->b<br/>c", "|"), "a|b|c");
    }

    #[test]
    fn image_round_trip() {
        let (stashed, tags) = stash_images(r#"<p>see <img src="a.png" alt="x"> here</p>"#);
        assert_eq!(stashed, "<p>see __IMG_TAG_0__ here</p>");
        let stripped = strip_tags(&stashed, "");
        assert_eq!(restore_images(&stripped, &tags), r#"see <img src="a.png" alt="x"> here"#);
    }

    #[test]
    fn meta_split() {
        let decoded = "Can you solve this real interview question? Two Sum - Given an array...\nMore";
        let (title, body) = split_meta_description(decoded);
        assert_eq!(title, Some("Two Sum"));
        assert!(body.starts_with("Given an array"));
    }

    #[test]
    fn meta_lookup_tolerates_extra_attributes() {
        let html = r#"<meta data-next-head="" name="description" content="Two Sum - x"/>"#;
        assert_eq!(meta_description(html), Some("Two Sum - x"));
    }
}
