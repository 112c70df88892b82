//! Page-level extraction: every component runs over the same raw markup and the
//! results are assembled into one [`Problem`].

pub mod code;
pub mod description;
pub mod format;
pub mod images;
pub mod markup;
pub mod title;

use crate::diagnostics::{Diagnostics, Silent, Stage};
use crate::error::ParseError;
use crate::problem::Problem;
use images::{ImageFetcher, Offline};

/// Runs the extractors against one page at a time. Holds no per-page state.
#[derive(Clone, Copy)]
pub struct Extractor<'a> {
    fetcher: &'a dyn ImageFetcher,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> Extractor<'a> {
    pub fn new(fetcher: &'a dyn ImageFetcher, diagnostics: &'a dyn Diagnostics) -> Self {
        Self { fetcher, diagnostics }
    }

    pub fn diagnostics(&self) -> &'a dyn Diagnostics {
        self.diagnostics
    }

    /// Parse one rendered problem page.
    ///
    /// Fails only when no description container can be located; every other
    /// shortfall degrades the affected field instead.
    pub fn parse_page(&self, html: &str) -> Result<Problem, ParseError> {
        let diag = self.diagnostics;
        let title = title::extract(html, diag);

        let recovered = description::recover(html, diag);
        let Some((text, container)) = recovered.and_then(|r| Some((r.text, r.container_html?))) else {
            let label = if title.is_empty() { "untitled page".to_string() } else { title };
            return Err(ParseError::NoDescription(label));
        };

        let code = code::reconstruct(html, diag);
        let extracted = images::extract(&container, self.fetcher, diag);
        let description = format::format_description(&text, &extracted.names);

        let referenced = format::referenced_images(&description);
        let mut images = extracted.images;
        images.retain(|img| referenced.contains(&img.filename));

        diag.record(
            Stage::Page,
            &format!(
                "title {:?}, description {} chars, code {} lines, {} images",
                title,
                description.chars().count(),
                code.lines().count(),
                images.len()
            ),
        );

        Ok(Problem {
            title,
            description,
            code,
            images,
            source_file: None,
            captured_at: None,
        })
    }
}

impl Default for Extractor<'static> {
    /// No network access and no diagnostics.
    fn default() -> Self {
        Self::new(&Offline, &Silent)
    }
}
