use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use super::markup::{
    decode_common_entities, decode_entities, meta_description, restore_images, split_meta_description,
    stash_images, strip_tags,
};
use crate::diagnostics::{Diagnostics, Stage};

static CONTENT_PANE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<div class="content__[^"]*?">.*?<div class="question-content__[^"]*?">(.*?)</div>.*?<div class="css-isal7m">"#,
    )
    .unwrap()
});
static DESCRIPTION_PANE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="description__[^"]*?">(.*?)</div>.*?<div class="editor__[^"]*?">"#).unwrap()
});
static STYLE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(style|script)\b[^>]*>.*?</(style|script)>").unwrap());
static CSS_RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[a-zA-Z-]+\s*\{[^}]*\}").unwrap());
static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</?p(?:\s[^>]*)?>|</(?:div|li|ul|ol|pre|h[1-6])\s*>").unwrap()
});
static INLINE_SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Container markers for the tree search, most specific first.
static CONTAINER_SELECTORS: LazyLock<Vec<(&'static str, Selector)>> = LazyLock::new(|| {
    [
        ("tracking marker", r#"div[data-track-load*="description_content"]"#),
        ("question-content class", r#"div[class*="question-content"]"#),
        ("description class", r#"div[class*="description"]"#),
    ]
    .into_iter()
    .map(|(name, css)| (name, Selector::parse(css).unwrap()))
    .collect()
});

/// Where the recovered statement came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSource {
    Pattern(&'static str),
    Container(&'static str),
    Meta,
}

#[derive(Debug, Clone)]
pub struct RecoveredDescription {
    /// Cleaned text; `<img>` tags are the only markup left in it.
    pub text: String,
    pub source: DescriptionSource,
    /// Inner HTML of the located description container, if one was found.
    pub container_html: Option<String>,
}

type Strategy = fn(&str) -> Option<RecoveredDescription>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("content pane pattern", content_pane),
    ("description pane pattern", description_pane),
    ("container search", container_search),
];

/// Best available problem statement. The meta description only wins when it is
/// longer than what the structural strategies produced.
pub fn recover(html: &str, diag: &dyn Diagnostics) -> Option<RecoveredDescription> {
    let structural = STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(html)?;
        diag.record(
            Stage::Description,
            &format!("{name} matched ({} chars)", found.text.chars().count()),
        );
        Some(found)
    });
    let meta = meta_text(html);

    match (structural, meta) {
        (Some(found), Some(meta)) if meta.chars().count() > found.text.chars().count() => {
            diag.record(
                Stage::Description,
                &format!("meta description is longer ({} chars), using it", meta.chars().count()),
            );
            Some(RecoveredDescription {
                text: meta,
                source: DescriptionSource::Meta,
                container_html: found.container_html,
            })
        }
        (Some(found), _) => Some(found),
        (None, Some(meta)) => {
            diag.record(Stage::Description, "only the meta description is available");
            Some(RecoveredDescription {
                text: meta,
                source: DescriptionSource::Meta,
                container_html: None,
            })
        }
        (None, None) => {
            diag.record(Stage::Description, "no description found");
            None
        }
    }
}

fn content_pane(html: &str) -> Option<RecoveredDescription> {
    from_pattern(&CONTENT_PANE_RE, "content pane", html)
}

fn description_pane(html: &str) -> Option<RecoveredDescription> {
    from_pattern(&DESCRIPTION_PANE_RE, "description pane", html)
}

fn from_pattern(re: &Regex, name: &'static str, html: &str) -> Option<RecoveredDescription> {
    let inner = re.captures(html)?.get(1)?.as_str();
    let text = clean_description_html(inner);
    if text.is_empty() {
        return None;
    }
    Some(RecoveredDescription {
        text,
        source: DescriptionSource::Pattern(name),
        container_html: Some(inner.to_string()),
    })
}

fn container_search(html: &str) -> Option<RecoveredDescription> {
    let document = Html::parse_document(html);
    CONTAINER_SELECTORS.iter().find_map(|(name, selector)| {
        let container = document.select(selector).next()?;
        let inner = container.inner_html();
        let text = clean_description_html(&inner);
        if text.is_empty() {
            return None;
        }
        Some(RecoveredDescription {
            text,
            source: DescriptionSource::Container(name),
            container_html: Some(inner),
        })
    })
}

fn meta_text(html: &str) -> Option<String> {
    let decoded = decode_entities(meta_description(html)?);
    let (_, body) = split_meta_description(&decoded);
    let text = clean_description_html(body);
    (!text.is_empty()).then_some(text)
}

/// Markup → plain statement text, keeping `<img>` tags for the formatter.
pub fn clean_description_html(html: &str) -> String {
    let without_styles = STYLE_BLOCK_RE.replace_all(html, "");
    let without_css = CSS_RULE_RE.replace_all(&without_styles, "");
    let (stashed, images) = stash_images(&without_css);

    let broken = LINE_BREAK_RE.replace_all(&stashed, "\n");
    let stripped = strip_tags(&broken, " ");
    let decoded = decode_common_entities(&stripped);

    let lines: Vec<String> = decoded
        .lines()
        .map(|line| INLINE_SPACE_RE.replace_all(line, " ").trim().to_string())
        .collect();
    let joined = lines.join("\n");
    let collapsed = BLANK_RUN_RE.replace_all(&joined, "\n\n");

    restore_images(collapsed.trim(), &images)
}
