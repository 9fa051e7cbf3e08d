pub mod crawler;
pub mod download;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod result;
pub mod validate;

pub use crawler::{CrawlEvent, CrawlRequest, Crawler, ProgressCallback};
pub use download::{DownloadResult, ImageDownloader};
pub use error::{ErrorKind, ScanError};
pub use extract::{ExtractorConfig, ImageRef, extract_images};
pub use fetch::{Document, PageFetcher};
pub use normalize::normalize;
pub use result::CrawlReport;
pub use validate::is_valid;
