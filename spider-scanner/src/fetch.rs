use crate::error::{Result, ScanError};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::{Duration, Instant};
use tracing::debug;
use url::Url;

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
const USER_AGENT: &str = "arachnida-spider/0.1 (https://github.com/trapdoorsec/arachnida)";

/// Build the HTTP client shared by the page fetcher and the image downloader.
pub fn build_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;
    Ok(client)
}

/// A parsed HTML page, reduced to the raw attribute values the crawl needs.
///
/// Values are kept exactly as they appear in markup and in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    image_sources: Vec<String>,
    anchor_hrefs: Vec<String>,
}

impl Document {
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);

        let img_selector = selector("img[src]")?;
        let image_sources = document
            .select(&img_selector)
            .filter_map(|element| element.value().attr("src"))
            .map(str::to_string)
            .collect();

        let link_selector = selector("a[href]")?;
        let anchor_hrefs = document
            .select(&link_selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect();

        Ok(Self {
            image_sources,
            anchor_hrefs,
        })
    }

    pub fn image_sources(&self) -> &[String] {
        &self.image_sources
    }

    pub fn anchor_hrefs(&self) -> &[String] {
        &self.anchor_hrefs
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScanError::ParseError(format!("selector {}: {:?}", css, e)))
}

/// A successfully fetched and parsed page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status_code: u16,
    pub response_time: Duration,
    pub document: Document,
}

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// GET `url` and parse the body as HTML.
    ///
    /// Timeouts, connection failures, non-2xx statuses and non-HTML bodies all
    /// come back as errors for the caller to log and skip.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url.as_str()).send().await?;
        let response_time = start.elapsed();

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase());

        if let Some(ref ct) = content_type
            && !ct.contains("html")
        {
            return Err(ScanError::ParseError(format!(
                "{} is not an HTML document ({})",
                url, ct
            )));
        }

        let body = response.text().await?;
        let document = Document::parse(&body)?;

        Ok(FetchedPage {
            url: url.clone(),
            status_code: status.as_u16(),
            response_time,
            document,
        })
    }
}
