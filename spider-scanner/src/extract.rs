//! Image discovery within a parsed page.

use crate::error::{Result, ScanError};
use crate::fetch::Document;
use crate::normalize::resolve;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".bmp"];

/// Which image resources are worth downloading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    extensions: Vec<String>,
}

impl ExtractorConfig {
    /// Extensions may be given with or without the leading dot; matching is
    /// case-insensitive.
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim().to_ascii_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether a filename ends with one of the allowed extensions.
    pub fn accepts(&self, filename: &str) -> bool {
        let lower = filename.to_ascii_lowercase();
        match lower.rfind('.') {
            Some(idx) if idx > 0 => self.extensions.iter().any(|ext| ext == &lower[idx..]),
            _ => false,
        }
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::with_extensions(DEFAULT_EXTENSIONS)
    }
}

/// An absolute image URL together with the filename it will be saved under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: Url,
    pub filename: String,
}

impl ImageRef {
    /// The filename is the last segment of the URL path and nothing else.
    pub fn from_url(url: Url) -> Result<Self> {
        let filename = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ScanError::MissingFilename(url.to_string()))?;
        Ok(Self { url, filename })
    }
}

/// Resolve every image source on the page and keep the allowed ones.
///
/// Order follows the document; duplicates are kept.
pub fn extract_images(page_url: &Url, document: &Document, config: &ExtractorConfig) -> Vec<ImageRef> {
    document
        .image_sources()
        .iter()
        .filter_map(|src| resolve(page_url, src))
        .filter_map(|url| ImageRef::from_url(url).ok())
        .filter(|image| config.accepts(&image.filename))
        .collect()
}
