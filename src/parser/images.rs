//! Embedded images of the description container: inline data URIs are decoded,
//! remote images fetched, and each gets a filename unique within its page.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};

use super::format::ImageNames;
use crate::diagnostics::{Diagnostics, Stage};
use crate::error::FetchError;
use crate::problem::Image;

pub const DEFAULT_EXTENSION: &str = "png";

static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());

/// Bytes and declared content type of one fetched image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError>;
}

/// Blocking HTTP fetcher with a per-request timeout.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage, FetchError> {
        let response = self.client.get(url).send()?.error_for_status()?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes()?.to_vec();
        if bytes.is_empty() {
            return Err(FetchError::Empty(url.to_string()));
        }
        Ok(FetchedImage { bytes, content_type })
    }
}

/// Refuses every request; used when remote images are turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct Offline;

impl ImageFetcher for Offline {
    fn fetch(&self, _url: &str) -> Result<FetchedImage, FetchError> {
        Err(FetchError::Disabled)
    }
}

#[derive(Debug, Default)]
pub struct ExtractedImages {
    /// First-encountered order.
    pub images: Vec<Image>,
    /// Original `src` → assigned filename.
    pub names: ImageNames,
}

/// Collect every usable `<img>` in the container. A failure on one image only
/// drops that image.
pub fn extract(
    container_html: &str,
    fetcher: &dyn ImageFetcher,
    diag: &dyn Diagnostics,
) -> ExtractedImages {
    let fragment = Html::parse_fragment(container_html);
    let mut out = ExtractedImages::default();
    let mut used: HashSet<String> = HashSet::new();

    for (index, img) in fragment.select(&IMG_SELECTOR).enumerate() {
        let Some(src) = img.value().attr("src").map(str::trim) else {
            continue;
        };
        if out.names.contains_key(src) {
            continue;
        }

        let resolved = if src.starts_with("data:image/") {
            decode_data_uri(src, index)
        } else if src.starts_with("http://") || src.starts_with("https://") {
            fetch_remote(src, index, fetcher)
        } else {
            continue;
        };

        match resolved {
            Ok((candidate, data)) => {
                let filename = unique_name(candidate, index, &used);
                diag.record(Stage::Images, &format!("{} bytes as {filename}", data.len()));
                used.insert(filename.clone());
                out.names.insert(src.to_string(), filename.clone());
                out.images.push(Image { filename, data });
            }
            Err(reason) => diag.record(Stage::Images, &format!("skipped image {index}: {reason}")),
        }
    }

    out
}

fn decode_data_uri(src: &str, index: usize) -> Result<(String, Vec<u8>), String> {
    let (header, payload) = src.split_once(',').ok_or("data URI without payload")?;
    let mut params = header.trim_start_matches("data:").split(';');
    let mime = params.next().unwrap_or_default();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(format!("unsupported data URI encoding for {mime}"));
    }
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let data = STANDARD
        .decode(compact)
        .map_err(|e| format!("invalid base64: {e}"))?;
    Ok((format!("image_{index}.{}", extension_for_mime(mime)), data))
}

fn fetch_remote(
    src: &str,
    index: usize,
    fetcher: &dyn ImageFetcher,
) -> Result<(String, Vec<u8>), String> {
    let fetched = fetcher.fetch(src).map_err(|e| e.to_string())?;
    let name = match url_basename(src) {
        Some(base) if base.contains('.') => base,
        _ => {
            let ext = fetched
                .content_type
                .as_deref()
                .map(extension_for_mime)
                .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
            format!("image_{index}.{ext}")
        }
    };
    Ok((name, fetched.bytes))
}

/// File extension for an image MIME type (parameters allowed).
pub fn extension_for_mime(mime: &str) -> String {
    let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    let subtype = essence.strip_prefix("image/").unwrap_or_default();
    match subtype {
        "jpeg" | "jpg" | "pjpeg" => "jpg".to_string(),
        "svg+xml" => "svg".to_string(),
        "x-icon" | "vnd.microsoft.icon" => "ico".to_string(),
        s if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()) => s.to_string(),
        _ => DEFAULT_EXTENSION.to_string(),
    }
}

/// Last path segment of a URL, reduced to filesystem-safe characters.
pub fn url_basename(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next()?;
    let without_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
    let (_, path) = without_scheme.split_once('/')?;
    let segment = path.rsplit('/').next()?;
    let safe: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed = safe.trim_matches('.');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn unique_name(candidate: String, index: usize, used: &HashSet<String>) -> String {
    if !used.contains(&candidate) {
        return candidate;
    }
    let ext = candidate
        .rsplit_once('.')
        .map_or(DEFAULT_EXTENSION, |(_, ext)| ext);
    let synthetic = format!("image_{index}.{ext}");
    if !used.contains(&synthetic) {
        return synthetic;
    }
    (1..)
        .map(|n| format!("image_{index}_{n}.{ext}"))
        .find(|name| !used.contains(name))
        .unwrap_or(synthetic)
}
