// Tests for crawl orchestration

use spider_core::crawl::{
    CrawlOptions, describe_request, execute_crawl, normalize_output_path, prepare_output_dir,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Output Path Tests
// ============================================================================

#[test]
fn test_normalize_output_path_default() {
    assert_eq!(normalize_output_path("./data/"), PathBuf::from("./data"));
}

#[test]
fn test_normalize_output_path_without_trailing_slash() {
    assert_eq!(normalize_output_path("images"), PathBuf::from("images"));
}

#[test]
fn test_normalize_output_path_multiple_trailing_slashes() {
    assert_eq!(normalize_output_path("out//"), PathBuf::from("out"));
}

#[test]
fn test_normalize_output_path_root() {
    assert_eq!(normalize_output_path("/"), PathBuf::from("/"));
}

#[test]
fn test_normalize_output_path_absolute() {
    assert_eq!(
        normalize_output_path("/tmp/spider/"),
        PathBuf::from("/tmp/spider")
    );
}

#[test]
fn test_prepare_output_dir_creates_nested() {
    let temp = tempfile::tempdir().unwrap();
    let target = temp.path().join("a/b/c");
    prepare_output_dir(&target).unwrap();
    assert!(target.is_dir());

    // Second call on an existing directory is fine
    prepare_output_dir(&target).unwrap();
}

#[test]
fn test_prepare_output_dir_rejects_file() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    let err = prepare_output_dir(&file).unwrap_err();
    assert!(err.contains("not a directory"));
}

// ============================================================================
// Request Summary Tests
// ============================================================================

#[test]
fn test_describe_request_non_recursive() {
    let options = CrawlOptions {
        url: Url::parse("https://ex.com/").unwrap(),
        recursive: false,
        level: 5,
        output_dir: PathBuf::from("./data"),
        timeout_secs: 5,
        show_progress_bars: false,
    };
    let text = describe_request(&options.to_request());
    assert!(text.contains("Recursive: false"));
    assert!(text.contains("Level: 0"));
}

// ============================================================================
// End-to-end Crawl Tests
// ============================================================================

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(
                    r#"<html><body><img src="/a.jpg"><a href="/b">B</a></body></html>"#.as_bytes(),
                ),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_bytes(
                    r#"<html><body><img src="/c.png"><a href="/b">self</a></body></html>"#
                        .as_bytes(),
                ),
        )
        .mount(server)
        .await;

    for image in ["/a.jpg", "/c.png"] {
        Mock::given(method("GET"))
            .and(path(image))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"imagedata".as_slice()))
            .mount(server)
            .await;
    }
}

fn options(server: &MockServer, output_dir: PathBuf) -> CrawlOptions {
    CrawlOptions {
        url: Url::parse(&server.uri()).unwrap(),
        recursive: true,
        level: 2,
        output_dir,
        timeout_secs: 5,
        show_progress_bars: false,
    }
}

fn sorted_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_execute_crawl_creates_output_and_downloads() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp = tempfile::tempdir().unwrap();
    let output_dir = temp.path().join("data");

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();
    let callback = Arc::new(move |msg: String| {
        messages_clone.lock().unwrap().push(msg);
    });

    let report = execute_crawl(
        options(&mock_server, output_dir.clone()),
        CancellationToken::new(),
        Some(callback),
    )
    .await
    .unwrap();

    assert_eq!(sorted_files(&output_dir), ["a.jpg", "c.png"]);
    assert_eq!(report.saved_count(), 2);
    assert_eq!(report.pages.len(), 2);

    let messages = messages.lock().unwrap();
    assert!(messages.iter().any(|m| m.starts_with("[saved]")));
    assert!(messages.iter().any(|m| m.starts_with("[depth 1]")));
}

#[tokio::test]
async fn test_execute_crawl_twice_only_skips() {
    let mock_server = MockServer::start().await;
    mount_site(&mock_server).await;

    let temp = tempfile::tempdir().unwrap();
    let output_dir = temp.path().join("data");

    let first = execute_crawl(
        options(&mock_server, output_dir.clone()),
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap();
    let files_after_first = sorted_files(&output_dir);

    let second = execute_crawl(
        options(&mock_server, output_dir.clone()),
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(first.saved_count(), 2);
    assert_eq!(second.saved_count(), 0);
    assert_eq!(second.skipped_count(), 2);
    assert_eq!(sorted_files(&output_dir), files_after_first);
}

#[tokio::test]
async fn test_execute_crawl_unreachable_seed_is_not_fatal() {
    // Nothing listens on this server once it is dropped
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let temp = tempfile::tempdir().unwrap();
    let report = execute_crawl(
        CrawlOptions {
            url: Url::parse(&uri).unwrap(),
            recursive: true,
            level: 5,
            output_dir: temp.path().to_path_buf(),
            timeout_secs: 1,
            show_progress_bars: false,
        },
        CancellationToken::new(),
        None,
    )
    .await
    .unwrap();

    assert!(report.downloads.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert!(!report.aborted);
}

#[tokio::test]
async fn test_execute_crawl_interrupted_mid_request_reports_aborted() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<p>slow</p>")
                .set_delay(std::time::Duration::from_secs(4)),
        )
        .mount(&mock_server)
        .await;

    let temp = tempfile::tempdir().unwrap();
    let mut opts = options(&mock_server, temp.path().join("data"));
    opts.timeout_secs = 30;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let report = execute_crawl(opts, cancel, None).await.unwrap();

    assert!(report.aborted);
    assert!(report.pages.is_empty());
}
