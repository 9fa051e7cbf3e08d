use crate::error::{ErrorKind, Result, ScanError};
use crate::extract::ImageRef;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of handing one image to the downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadResult {
    Saved(PathBuf),
    SkippedExisting(PathBuf),
    Failed { kind: ErrorKind, reason: String },
}

impl DownloadResult {
    fn failed(err: &ScanError) -> Self {
        DownloadResult::Failed {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, DownloadResult::Saved(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DownloadResult::SkippedExisting(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DownloadResult::Failed { .. })
    }
}

pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Save `image` as `output_dir/<filename>`.
    ///
    /// An existing file with the same name short-circuits before any request
    /// is made. Two different images sharing a basename therefore collide and
    /// only the first one is kept.
    pub async fn download(&self, image: &ImageRef, output_dir: &Path) -> DownloadResult {
        let target = output_dir.join(&image.filename);

        if target.exists() {
            debug!("Skipping {}: {} already exists", image.url, target.display());
            return DownloadResult::SkippedExisting(target);
        }

        match self.fetch_and_store(image, output_dir, &target).await {
            Ok(bytes) => {
                info!("Saved {} ({} bytes) to {}", image.url, bytes, target.display());
                DownloadResult::Saved(target)
            }
            Err(e) => {
                warn!("Failed to download {}: {}", image.url, e);
                DownloadResult::failed(&e)
            }
        }
    }

    async fn fetch_and_store(&self, image: &ImageRef, output_dir: &Path, target: &Path) -> Result<usize> {
        let response = self.client.get(image.url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: image.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        write_atomically(output_dir, target, &body)?;
        Ok(body.len())
    }
}

/// Write through a temporary file in the same directory and rename it into
/// place. The temporary file is removed when dropped on any error path, so
/// `target` either holds the complete body or does not exist.
fn write_atomically(output_dir: &Path, target: &Path, body: &[u8]) -> Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".spider-")
        .suffix(".part")
        .tempfile_in(output_dir)?;

    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| ScanError::IoError(e.error))?;
    Ok(())
}
