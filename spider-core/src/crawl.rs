use indicatif::{ProgressBar, ProgressStyle};
use spider_scanner::{CrawlEvent, CrawlReport, CrawlRequest, Crawler, DownloadResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_LEVEL: usize = 5;
pub const DEFAULT_OUTPUT_DIR: &str = "./data/";

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub url: Url,
    pub recursive: bool,
    pub level: usize,
    pub output_dir: PathBuf,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    /// The request the engine will actually run, with depth forced to 0
    /// when recursion is off.
    pub fn to_request(&self) -> CrawlRequest {
        CrawlRequest::new(
            self.url.clone(),
            self.recursive,
            self.level,
            self.output_dir.clone(),
        )
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Expand `~` and drop trailing slashes, keeping a bare `/` intact.
pub fn normalize_output_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw.trim());
    let trimmed = expanded.trim_end_matches('/');
    if trimmed.is_empty() {
        if expanded.starts_with('/') {
            PathBuf::from("/")
        } else {
            PathBuf::from(".")
        }
    } else {
        PathBuf::from(trimmed)
    }
}

/// Create the output directory if it does not exist yet.
pub fn prepare_output_dir(path: &Path) -> Result<(), String> {
    if path.exists() && !path.is_dir() {
        return Err(format!("{} exists and is not a directory", path.display()));
    }
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create output directory {}: {}", path.display(), e))
}

/// Render the effective request the way it is echoed before crawling.
pub fn describe_request(request: &CrawlRequest) -> String {
    let mut out = String::new();
    out.push_str(&format!("URL: {}\n", request.seed_url()));
    out.push_str(&format!("Recursive: {}\n", request.recursive()));
    out.push_str(&format!("Level: {}\n", request.max_depth()));
    out.push_str(&format!("Path: {}\n", request.output_dir().display()));
    out
}

/// Execute a crawl with the given options
///
/// Cancelling `cancel` drops the in-flight request and stops the crawl; the
/// partial report comes back with `aborted` set.
pub async fn execute_crawl(
    options: CrawlOptions,
    cancel: CancellationToken,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlReport, String> {
    prepare_output_dir(&options.output_dir)?;
    info!("Saving images to {}", options.output_dir.display());

    let request = options.to_request();

    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| format!("Invalid progress template: {}", e))?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let pages = Arc::new(AtomicUsize::new(0));
    let images = Arc::new(AtomicUsize::new(0));

    let pb_clone = progress_bar.clone();
    let pages_clone = pages.clone();
    let images_clone = images.clone();
    let user_callback = progress_callback.clone();
    let internal_callback: spider_scanner::ProgressCallback = Arc::new(move |event: CrawlEvent| {
        let message = match event {
            CrawlEvent::PageFetched { url, depth } => {
                pages_clone.fetch_add(1, Ordering::Relaxed);
                format!("[depth {}] {}", depth, url)
            }
            CrawlEvent::PageFailed { url } => format!("[!] Skipped {}", url),
            CrawlEvent::ImageHandled { url, result } => {
                let label = match result {
                    DownloadResult::Saved(_) => {
                        images_clone.fetch_add(1, Ordering::Relaxed);
                        "saved"
                    }
                    DownloadResult::SkippedExisting(_) => "exists",
                    DownloadResult::Failed { .. } => "failed",
                };
                format!("[{}] {}", label, url)
            }
        };

        if let Some(ref pb) = pb_clone {
            pb.set_message(format!(
                "Crawling... {} pages, {} images saved | {}",
                pages_clone.load(Ordering::Relaxed),
                images_clone.load(Ordering::Relaxed),
                message
            ));
        }
        if let Some(ref callback) = user_callback {
            callback(message);
        }
    });

    let crawler = Crawler::new(request)
        .with_timeout(Duration::from_secs(options.timeout_secs))
        .with_cancel_token(cancel)
        .with_progress_callback(internal_callback);

    let result = crawler.crawl().await;

    if let Some(ref pb) = progress_bar {
        match result {
            Ok(ref report) if report.aborted => pb.abandon_with_message("Crawl aborted"),
            Ok(ref report) => pb.finish_with_message(format!(
                "Crawl complete! {} pages, {} images saved",
                report.pages.len(),
                report.saved_count()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result.map_err(|e| {
        warn!("Crawl of {} failed: {}", options.url, e);
        e.to_string()
    })
}
