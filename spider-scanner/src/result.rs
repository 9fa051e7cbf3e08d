use crate::download::DownloadResult;
use crate::error::{ErrorKind, ScanError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A page that was fetched and expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVisit {
    pub url: String,
    pub depth: usize,
    pub status_code: u16,
    pub response_time: Duration,
    pub images_found: usize,
    pub links_followed: usize,
}

/// One image handed to the downloader, and what became of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDownload {
    pub page_url: String,
    pub image_url: String,
    pub filename: String,
    pub result: DownloadResult,
}

/// A unit of work that was skipped because of an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlIssue {
    pub url: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl CrawlIssue {
    pub fn from_error(url: impl Into<String>, err: &ScanError) -> Self {
        Self {
            url: url.into(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub seed_url: String,
    pub output_dir: PathBuf,
    pub max_depth: usize,
    pub pages: Vec<PageVisit>,
    pub downloads: Vec<ImageDownload>,
    pub errors: Vec<CrawlIssue>,
    pub visited_count: usize,
    pub aborted: bool,
}

impl CrawlReport {
    pub fn new(seed_url: String, output_dir: PathBuf, max_depth: usize) -> Self {
        Self {
            seed_url,
            output_dir,
            max_depth,
            pages: Vec::new(),
            downloads: Vec::new(),
            errors: Vec::new(),
            visited_count: 0,
            aborted: false,
        }
    }

    pub fn saved_files(&self) -> Vec<&PathBuf> {
        self.downloads
            .iter()
            .filter_map(|d| match &d.result {
                DownloadResult::Saved(path) => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn saved_count(&self) -> usize {
        self.downloads.iter().filter(|d| d.result.is_saved()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.downloads.iter().filter(|d| d.result.is_skipped()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.downloads.iter().filter(|d| d.result.is_failed()).count()
    }
}
