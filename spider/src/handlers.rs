use clap::ArgMatches;
use colored::Colorize;
use spider_core::crawl::{
    CrawlOptions, DEFAULT_LEVEL, DEFAULT_OUTPUT_DIR, describe_request,
    execute_crawl, normalize_output_path,
};
use spider_core::print_banner;
use spider_core::report::{ReportFormat, generate_crawl_report};
use spider_scanner::CrawlReport;
use spider_scanner::fetch::DEFAULT_TIMEOUT_SECS;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use url::Url;

/// Exit status after an operator interrupt (128 + SIGINT).
pub const EXIT_ABORTED: i32 = 130;
pub const EXIT_FAILURE: i32 = 1;

/// Everything the crawl handler needs, pulled out of the parsed arguments.
pub struct CrawlSettings {
    pub options: CrawlOptions,
    pub format: ReportFormat,
    pub quiet: bool,
    pub verbosity: u8,
}

impl CrawlSettings {
    pub fn log_level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }
}

pub fn parse_crawl_settings(matches: &ArgMatches) -> Result<CrawlSettings, String> {
    let url = matches
        .get_one::<Url>("URL")
        .cloned()
        .ok_or_else(|| "A URL is required".to_string())?;
    let recursive = matches.get_flag("recursive");
    let level = matches
        .get_one::<usize>("level")
        .copied()
        .unwrap_or(DEFAULT_LEVEL);
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or(DEFAULT_OUTPUT_DIR);
    let timeout_secs = matches
        .get_one::<u64>("timeout")
        .copied()
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format =
        ReportFormat::from_str(format).ok_or_else(|| format!("Unknown report format '{}'", format))?;
    let quiet = matches.get_flag("quiet");
    let verbosity = matches.get_count("verbose");

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("Unsupported URL scheme '{}': use http or https", url.scheme()));
    }

    Ok(CrawlSettings {
        options: CrawlOptions {
            url,
            recursive,
            level,
            output_dir: normalize_output_path(path),
            timeout_secs,
            show_progress_bars: !quiet,
        },
        format,
        quiet,
        verbosity,
    })
}

/// Install a Ctrl-C listener that cancels `cancel`.
fn install_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Interrupt received, stopping...", "[!]".yellow().bold());
            cancel.cancel();
        }
    });
}

/// Process exit status for a finished crawl. Page and image failures are
/// recovered from, so only an operator interrupt is non-zero.
pub fn exit_status(report: &CrawlReport) -> i32 {
    if report.aborted { EXIT_ABORTED } else { 0 }
}

/// Run a crawl from parsed arguments and return the process exit status.
pub async fn handle_crawl(matches: &ArgMatches) -> i32 {
    let settings = match parse_crawl_settings(matches) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("✗ {}", e);
            return EXIT_FAILURE;
        }
    };

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(settings.log_level())
        .init();

    // Keep stdout clean for machine-readable reports
    if !settings.quiet && settings.format == ReportFormat::Text {
        print_banner();
        print!("{}", describe_request(&settings.options.to_request()));
        println!("{}", "═".repeat(60).bright_blue().bold());
        println!();
    }

    let cancel = CancellationToken::new();
    install_interrupt_handler(cancel.clone());

    let CrawlSettings { options, format, .. } = settings;

    let report = match execute_crawl(options, cancel, None).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("✗ Crawl failed: {}", e);
            return EXIT_FAILURE;
        }
    };

    match generate_crawl_report(&report, format) {
        Ok(rendered) => print!("{}", rendered),
        Err(e) => eprintln!("✗ {}", e),
    }

    let status = exit_status(&report);
    if status == EXIT_ABORTED {
        eprintln!("{} Crawl aborted by operator", "✗".red().bold());
    }
    status
}
