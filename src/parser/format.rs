//! Turns recovered statement text into themed HTML blocks: body paragraphs,
//! example blocks, a constraints list and a follow-up note.

use std::collections::HashMap;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::{Captures, Regex};

use super::markup::{decode_entities, escape_html, img_tags, restore_images, stash_images, strip_tags};

/// `src` as a whole attribute name, so `data-src` and friends never match.
static SRC_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(^|[\s<])src\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});
static CSS_OPENER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[.#@][A-Za-z_-][\w\s,.:#>-]*\{").unwrap());
static FOLLOW_UP_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^follow[\s-]*up\s*:?\s*").unwrap());

const EXAMPLE_FIELDS: &[&str] = &["Input:", "Output:", "Explanation:"];
const FOLLOW_UP_HINTS: &[&str] = &["o(n)", "solution", "complexity"];

/// Image `src` → assigned filename, as produced by the image extractor.
pub type ImageNames = HashMap<String, String>;

#[derive(Default)]
struct Scanner {
    out: Vec<String>,
    example: Vec<String>,
    in_example: bool,
    in_constraints: bool,
    constraints: Vec<String>,
    text: Option<String>,
    follow_up: Vec<String>,
    in_css: bool,
}

impl Scanner {
    fn flush_text(&mut self) {
        if let Some(text) = self.text.take() {
            self.out.push(format!(r#"<div class="description-line">{text}</div>"#));
        }
    }

    fn close_example(&mut self) {
        if self.in_example {
            self.example.push("</div></div>".to_string());
            self.out.push(self.example.drain(..).join("\n"));
            self.in_example = false;
        }
    }

    fn close_constraints(&mut self) {
        if self.in_constraints {
            let items = self
                .constraints
                .drain(..)
                .map(|item| format!("<li>{item}</li>"))
                .join("");
            self.out.push(format!(r#"<ul class="constraints">{items}</ul>"#));
            self.in_constraints = false;
        }
    }

    fn push_text(&mut self, line: &str) {
        match &mut self.text {
            Some(text) => {
                text.push(' ');
                text.push_str(line);
            }
            None => self.text = Some(line.to_string()),
        }
    }

    /// Stray stylesheet lines that survived recovery. True when `raw` was one.
    fn skip_css(&mut self, raw: &str) -> bool {
        if self.in_css {
            if raw.contains('}') {
                self.in_css = false;
            }
            return true;
        }
        if CSS_OPENER_RE.is_match(raw) {
            self.in_css = !raw.contains('}');
            return true;
        }
        false
    }

    fn line(&mut self, line: &str) {
        if line.starts_with("Example") {
            self.flush_text();
            self.close_example();
            self.close_constraints();
            self.example.push(format!(
                r#"<div class="example"><div class="example-title">{line}</div><div class="example-content">"#
            ));
            self.in_example = true;
        } else if EXAMPLE_FIELDS.iter().any(|field| line.starts_with(field)) {
            self.flush_text();
            if self.in_example {
                self.example.push(format!(r#"<pre class="example-line">{line}</pre>"#));
            } else {
                self.out.push(format!(r#"<div class="description-line">{line}</div>"#));
            }
        } else if line.starts_with("Constraints:") {
            self.flush_text();
            self.close_example();
            self.close_constraints();
            self.out.push(format!(r#"<div class="constraints-title">{line}</div>"#));
            self.in_constraints = true;
        } else if is_follow_up(line) {
            self.flush_text();
            self.close_example();
            self.close_constraints();
            self.follow_up.push(line.to_string());
        } else if self.in_example {
            self.example.push(format!(r#"<pre class="example-line">{line}</pre>"#));
        } else if self.in_constraints {
            self.constraints.push(line.to_string());
        } else if !line.starts_with('.') {
            self.push_text(line);
        }
    }

    fn finish(mut self) -> String {
        self.flush_text();
        self.close_example();
        self.close_constraints();
        if !self.follow_up.is_empty() {
            let joined = self.follow_up.join(" ");
            let note = FOLLOW_UP_LABEL_RE.replace(joined.trim(), "");
            self.out.push(format!(
                r#"<div class="follow-up"><strong>Follow-up:</strong> {note}</div>"#
            ));
        }
        let mut doc = vec![r#"<div class="description">"#.to_string()];
        doc.append(&mut self.out);
        doc.push("</div>".to_string());
        doc.join("\n")
    }
}

fn is_follow_up(line: &str) -> bool {
    if line.starts_with("Follow") {
        return true;
    }
    let lower = line.to_lowercase();
    FOLLOW_UP_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Format recovered description text. Every `<img>` whose source was extracted
/// is rewritten to its assigned filename.
pub fn format_description(description: &str, images: &ImageNames) -> String {
    let mut scanner = Scanner::default();

    for raw in description.lines() {
        if raw.trim().is_empty() {
            scanner.flush_text();
            continue;
        }
        if scanner.skip_css(raw.trim()) {
            continue;
        }
        if raw.contains("<img") || raw.contains("<IMG") {
            scanner.flush_text();
        }
        let line = clean_line(raw, images);
        if !line.is_empty() {
            scanner.line(&line);
        }
    }

    scanner.finish()
}

/// Rewrite image sources, strip every other tag, and escape the text.
fn clean_line(raw: &str, images: &ImageNames) -> String {
    let (stashed, tags) = stash_images(raw);
    let tags: Vec<String> = tags.iter().map(|tag| rewrite_img(tag, images)).collect();
    let text = decode_entities(&strip_tags(&stashed, ""));
    restore_images(escape_html(&text).trim(), &tags)
}

fn rewrite_img(tag: &str, images: &ImageNames) -> String {
    SRC_ATTR_RE
        .replace(tag, |caps: &Captures| {
            let src = src_value(caps);
            let inline_or_remote = src.starts_with("data:image/") || src.starts_with("http");
            // Serialized markup keeps `&amp;` in URLs; the extractor saw decoded values.
            let assigned = images.get(src).or_else(|| images.get(&decode_entities(src)));
            match assigned {
                Some(filename) if inline_or_remote => format!(r#"{}src="{filename}""#, &caps[1]),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Filenames referenced by `<img src>` in a formatted description.
pub fn referenced_images(formatted: &str) -> Vec<String> {
    img_tags(formatted)
        .filter_map(|tag| {
            let caps = SRC_ATTR_RE.captures(tag)?;
            Some(src_value(&caps).to_string())
        })
        .collect()
}

/// Attribute value from whichever quoting form matched, trimmed the same way
/// the image extractor trims it.
fn src_value<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(2)
        .or_else(|| caps.get(3))
        .or_else(|| caps.get(4))
        .map_or("", |m| m.as_str().trim())
}
