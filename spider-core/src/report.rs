// Crawl report rendering

use colored::Colorize;
use serde::{Deserialize, Serialize};
use spider_scanner::{CrawlReport, DownloadResult};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

pub fn generate_crawl_report(report: &CrawlReport, format: ReportFormat) -> Result<String, String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| format!("Failed to serialize report: {}", e)),
    }
}

fn generate_text_report(report: &CrawlReport) -> String {
    let mut out = String::new();
    let divider = "━".repeat(52);

    out.push_str(&format!("{}\n\n", divider));
    out.push_str(&format!("{}\n", "# Summary:".bold()));
    out.push_str(&format!("  Seed: {}\n", report.seed_url));
    out.push_str(&format!("  Output directory: {}\n", report.output_dir.display()));
    out.push_str(&format!("  Max depth: {}\n", report.max_depth));
    out.push_str(&format!("  Pages crawled: {}\n", report.pages.len()));
    out.push_str(&format!("  URLs visited: {}\n", report.visited_count));
    out.push_str(&format!("  Images saved: {}\n", report.saved_count()));
    out.push_str(&format!("  Images already present: {}\n", report.skipped_count()));
    out.push_str(&format!("  Images failed: {}\n", report.failed_count()));
    out.push_str(&format!("  Errors: {}\n", report.errors.len()));
    if report.aborted {
        out.push_str(&format!("  {}\n", "Crawl aborted by operator".red().bold()));
    }
    out.push_str(&format!("\n{}\n\n", divider));

    if !report.pages.is_empty() {
        out.push_str(&format!("{}\n", "## Pages".bold()));
        for page in &report.pages {
            out.push_str(&format!(
                "  {} {} {}\n",
                format!("[{}]", page.depth).bright_black(),
                page.status_code.to_string().green(),
                extract_url_path(&page.url)
            ));
        }
        out.push('\n');
    }

    if !report.downloads.is_empty() {
        out.push_str(&format!("{}\n", "## Images".bold()));

        // Group by the page the image was found on, in crawl order
        let mut by_page: Vec<(&str, Vec<String>)> = Vec::new();
        for download in &report.downloads {
            let line = match &download.result {
                DownloadResult::Saved(_) => format!("{} {}", "✓".green(), download.filename),
                DownloadResult::SkippedExisting(_) => {
                    format!("{} {} (already present)", "↪".cyan(), download.filename)
                }
                DownloadResult::Failed { reason, .. } => {
                    format!("{} {} {}", "✗".red(), download.filename, reason.bright_black())
                }
            };
            match by_page.iter().position(|(page, _)| *page == download.page_url) {
                Some(idx) => by_page[idx].1.push(line),
                None => by_page.push((download.page_url.as_str(), vec![line])),
            }
        }

        for (page_url, lines) in &by_page {
            out.push_str(&format!("  {}\n", extract_url_path(page_url)));
            for line in lines {
                out.push_str(&format!("    {}\n", line));
            }
        }
        out.push('\n');
    }

    if !report.errors.is_empty() {
        out.push_str(&format!("{}\n", "## Errors".bold()));
        for issue in &report.errors {
            out.push_str(&format!(
                "  {} {} {}\n",
                format!("[{}]", issue.kind).yellow(),
                issue.url,
                issue.message.bright_black()
            ));
        }
        out.push('\n');
    }

    out
}
