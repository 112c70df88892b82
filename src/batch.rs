//! Directory batches: every `*.html` page in one folder, in file-name order.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use walkdir::WalkDir;

use crate::diagnostics::Stage;
use crate::error::ParseError;
use crate::parser::Extractor;
use crate::problem::Problem;

/// Browsers append the save time to the file name, e.g. `Two Sum - LeetCode (17_03_2024 21：45：10).html`.
/// Some locales write full-width colons.
static CAPTURE_STAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\((\d{2}_\d{2}_\d{4} \d{2}[：:]\d{2}[：:]\d{2})\)").unwrap()
});
static SITE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s*-\s*LeetCode\s*$").unwrap());

const CAPTURE_STAMP_FORMAT: &str = "%d_%m_%Y %H:%M:%S";

/// What to do when one page in a batch cannot be parsed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Abort the batch with the page's error.
    #[default]
    FailFast,
    /// Record the page as skipped and carry on.
    SkipFailures,
}

#[derive(Debug)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub problems: Vec<Problem>,
    pub skipped: Vec<Skipped>,
}

/// Page files directly inside `dir`, sorted by file name.
pub fn list_pages(dir: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let mut pages = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|source| ParseError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_html(entry.path()) {
            pages.push(entry.into_path());
        }
    }
    Ok(pages)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}

/// Parse one saved page, filling in file-derived metadata.
pub fn parse_file(extractor: &Extractor<'_>, path: &Path) -> Result<Problem, ParseError> {
    let bytes = std::fs::read(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let html = String::from_utf8_lossy(&bytes);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut problem = extractor.parse_page(&html).map_err(|err| match err {
        ParseError::NoDescription(_) => ParseError::NoDescription(file_name.clone()),
        other => other,
    })?;

    if problem.title.is_empty() {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        problem.title = title_from_file_name(&stem);
        extractor
            .diagnostics()
            .record(Stage::Title, &format!("falling back to file name: {}", problem.title));
    }
    problem.captured_at = captured_at(&file_name);
    problem.source_file = Some(file_name);
    Ok(problem)
}

/// Parse `pages` in order, calling `on_page` after each attempt.
pub fn parse_pages(
    extractor: &Extractor<'_>,
    pages: &[PathBuf],
    policy: BatchPolicy,
    mut on_page: impl FnMut(&Path),
) -> Result<BatchReport, ParseError> {
    let mut report = BatchReport::default();
    for path in pages {
        let parsed = parse_file(extractor, path);
        on_page(path);
        match parsed {
            Ok(problem) => report.problems.push(problem),
            Err(err) if policy == BatchPolicy::SkipFailures => {
                extractor
                    .diagnostics()
                    .record(Stage::Page, &format!("skipping {}: {err}", path.display()));
                report.skipped.push(Skipped {
                    path: path.clone(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

pub fn parse_directory(
    extractor: &Extractor<'_>,
    dir: &Path,
    policy: BatchPolicy,
) -> Result<BatchReport, ParseError> {
    let pages = list_pages(dir)?;
    parse_pages(extractor, &pages, policy, |_| {})
}

/// Save time encoded in a browser-saved file name.
pub fn captured_at(file_name: &str) -> Option<NaiveDateTime> {
    let stamp = CAPTURE_STAMP_RE.captures(file_name)?[1].replace('：', ":");
    NaiveDateTime::parse_from_str(&stamp, CAPTURE_STAMP_FORMAT).ok()
}

/// Title guess from a file stem: drops the save time and the site suffix.
pub fn title_from_file_name(stem: &str) -> String {
    let without_stamp = CAPTURE_STAMP_RE.replace(stem, "");
    SITE_SUFFIX_RE.replace(without_stamp.trim(), "").trim().to_string()
}
