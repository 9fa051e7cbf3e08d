use crate::download::{DownloadResult, ImageDownloader};
use crate::error::{Result, ScanError};
use crate::extract::{ExtractorConfig, extract_images};
use crate::fetch::{DEFAULT_TIMEOUT_SECS, PageFetcher, build_client};
use crate::normalize::{normalize_url, resolve};
use crate::result::{CrawlIssue, CrawlReport, ImageDownload, PageVisit};
use crate::validate::is_valid;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

/// Progress notifications emitted while a crawl runs.
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    PageFetched { url: String, depth: usize },
    PageFailed { url: String },
    ImageHandled { url: String, result: DownloadResult },
}

pub type ProgressCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

/// What to crawl and where to put the images. Fixed for the whole crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    seed_url: Url,
    recursive: bool,
    max_depth: usize,
    output_dir: PathBuf,
}

impl CrawlRequest {
    /// A non-recursive request always has an effective depth of 0.
    pub fn new(seed_url: Url, recursive: bool, max_depth: usize, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            seed_url,
            recursive,
            max_depth: if recursive { max_depth } else { 0 },
            output_dir: output_dir.into(),
        }
    }

    pub fn seed_url(&self) -> &Url {
        &self.seed_url
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// A page selected for traversal.
#[derive(Debug, Clone)]
struct CrawlNode {
    url: Url,
    normalized: String,
    depth: usize,
}

impl CrawlNode {
    fn new(url: Url, depth: usize) -> Self {
        let normalized = normalize_url(&url);
        Self {
            url,
            normalized,
            depth,
        }
    }
}

pub struct Crawler {
    request: CrawlRequest,
    timeout: Duration,
    extractor: ExtractorConfig,
    progress_callback: Option<ProgressCallback>,
    cancel: CancellationToken,
}

impl Crawler {
    pub fn new(request: CrawlRequest) -> Self {
        Self {
            request,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            extractor: ExtractorConfig::default(),
            progress_callback: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Share an externally owned token. Cancelling it drops the in-flight
    /// request and stops the crawl.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }

    /// Depth-first, document-ordered crawl from the seed URL.
    ///
    /// Individual fetch and download failures are logged and recorded in the
    /// report; only a failure to build the HTTP client is returned as an error.
    pub async fn crawl(&self) -> Result<CrawlReport> {
        let seed = self.request.seed_url();
        let max_depth = self.request.max_depth();
        let output_dir = self.request.output_dir();

        if !matches!(seed.scheme(), "http" | "https") {
            return Err(ScanError::InvalidUrl(format!(
                "{} (only http and https are supported)",
                seed
            )));
        }

        info!("Starting crawl of {} (max depth {})", seed, max_depth);

        let client = build_client(self.timeout)?;
        let fetcher = PageFetcher::new(client.clone());
        let downloader = ImageDownloader::new(client);

        let mut report = CrawlReport::new(seed.to_string(), output_dir.to_path_buf(), max_depth);
        let mut visited: HashSet<String> = HashSet::new();

        // LIFO work-list; children are pushed in reverse so they pop in document order
        let mut stack = vec![CrawlNode::new(seed.clone(), 0)];

        'crawl: while let Some(node) = stack.pop() {
            if !visited.insert(node.normalized.clone()) {
                debug!("Already visited {}", node.normalized);
                continue;
            }

            if node.depth > max_depth {
                continue;
            }

            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    report.aborted = true;
                    break;
                }
                fetched = fetcher.fetch(&node.url) => fetched,
            };

            let page = match fetched {
                Ok(page) => page,
                Err(e) => {
                    warn!("Crawl error for {}: {}", node.url, e);
                    report.errors.push(CrawlIssue::from_error(node.url.as_str(), &e));
                    self.emit(CrawlEvent::PageFailed {
                        url: node.url.to_string(),
                    });
                    continue;
                }
            };

            self.emit(CrawlEvent::PageFetched {
                url: node.url.to_string(),
                depth: node.depth,
            });

            let images = extract_images(&node.url, &page.document, &self.extractor);
            debug!("{} image(s) on {}", images.len(), node.url);

            for image in &images {
                // The body only hits the disk once fully received, so dropping
                // the download here never leaves a partial file
                let result = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        report.aborted = true;
                        break 'crawl;
                    }
                    result = downloader.download(image, output_dir) => result,
                };
                if let DownloadResult::Failed { kind, reason } = &result {
                    report.errors.push(CrawlIssue {
                        url: image.url.to_string(),
                        kind: *kind,
                        message: reason.clone(),
                    });
                }

                self.emit(CrawlEvent::ImageHandled {
                    url: image.url.to_string(),
                    result: result.clone(),
                });

                report.downloads.push(ImageDownload {
                    page_url: node.url.to_string(),
                    image_url: image.url.to_string(),
                    filename: image.filename.clone(),
                    result,
                });
            }

            let mut children = Vec::new();
            if node.depth < max_depth {
                for href in page.document.anchor_hrefs() {
                    if !is_valid(href, &node.url) {
                        continue;
                    }
                    if let Some(url) = resolve(&node.url, href) {
                        let child = CrawlNode::new(url, node.depth + 1);
                        if !visited.contains(&child.normalized) {
                            children.push(child);
                        }
                    }
                }
            }

            report.pages.push(PageVisit {
                url: node.url.to_string(),
                depth: node.depth,
                status_code: page.status_code,
                response_time: page.response_time,
                images_found: images.len(),
                links_followed: children.len(),
            });

            stack.extend(children.into_iter().rev());
        }

        report.visited_count = visited.len();
        report.aborted |= self.is_cancelled();

        if report.aborted {
            warn!("Crawl of {} aborted after {} page(s)", seed, report.pages.len());
        } else {
            info!(
                "Crawl complete. Visited {} pages, saved {} image(s)",
                report.pages.len(),
                report.saved_count()
            );
        }

        Ok(report)
    }
}
