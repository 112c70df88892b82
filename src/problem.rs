use chrono::NaiveDateTime;
use serde::Serialize;

/// One parsed problem page.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    pub title: String,
    /// Presentation-ready HTML, not the page's raw markup.
    pub description: String,
    pub code: String,
    pub images: Vec<Image>,
    pub source_file: Option<String>,
    pub captured_at: Option<NaiveDateTime>,
}

/// Image referenced from a problem description. `filename` is unique within its problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    pub filename: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Problem {
    pub fn image(&self, filename: &str) -> Option<&Image> {
        self.images.iter().find(|img| img.filename == filename)
    }
}
