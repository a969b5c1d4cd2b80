use crate::config::CrawlConfig;
use crate::fetcher::HttpFetcher;
use crate::types::{CrawlRecord, CrawlReport, CrawlStatus, StageStatus};
use anyhow::Result;
use chrono::Utc;
use std::sync::mpsc;

/// Trait for page fetchers (to allow mocking)
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Raw content for one fetched page, before truncation
#[derive(Debug, Clone, Default)]
pub struct FetchedPage {
    pub html: String,
    pub markdown: String,
    pub links: Vec<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Accept either a JSON-encoded list of URLs or a single bare URL
pub fn parse_url_list(input: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(input) {
        Ok(urls) => urls,
        Err(_) => vec![input.to_string()],
    }
}

/// Fetch each URL independently; one failure never aborts the batch.
/// Stored content is truncated to the configured byte budget and the link
/// list capped, to bound downstream packet size.
pub async fn fetch_pages(
    urls: &[String],
    fetcher: &impl PageFetcher,
    config: &CrawlConfig,
) -> CrawlReport {
    tracing::info!(
        url_count = urls.len(),
        max_depth = config.max_depth,
        "Starting crawl"
    );

    let mut records = Vec::new();
    let mut success_count = 0;
    let mut error_count = 0;
    let mut total_size_bytes = 0;

    for url in urls {
        match fetcher.fetch(url).await {
            Ok(page) => {
                let content_size_bytes = page.html.len();
                total_size_bytes += content_size_bytes;
                success_count += 1;
                records.push(CrawlRecord {
                    url: url.clone(),
                    status: CrawlStatus::Success,
                    html: truncate_to_boundary(&page.html, config.content_byte_budget)
                        .to_string(),
                    markdown: truncate_to_boundary(&page.markdown, config.content_byte_budget)
                        .to_string(),
                    links: page.links.into_iter().take(config.max_links).collect(),
                    title: page.title,
                    description: page.description,
                    content_size_bytes,
                    crawled_at: Utc::now(),
                    error_message: None,
                });
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Fetch failed, continuing");
                error_count += 1;
                records.push(CrawlRecord::error(url, e.to_string()));
            }
        }
    }

    tracing::info!(
        success_count,
        error_count,
        total_size_bytes,
        "Crawl completed"
    );

    CrawlReport {
        status: StageStatus::Success,
        records,
        success_count,
        error_count,
        total_size_bytes,
        generated_at: Utc::now(),
    }
}

/// Blocking entry point with a real HTTP fetcher.
///
/// Runs the whole crawl on a dedicated worker thread owning its own
/// single-thread runtime, so it is safe to call both with and without an
/// ambient tokio runtime. The fetcher (and its HTTP client) is constructed
/// inside the worker and scoped to this call.
pub fn fetch_pages_blocking(urls: Vec<String>, config: CrawlConfig) -> CrawlReport {
    fetch_pages_blocking_with(urls, config, HttpFetcher::new)
}

/// Blocking entry point with a caller-supplied fetcher factory.
///
/// Waits at most `config.wait_timeout_secs`; past the bound the crawl is
/// abandoned and reported as a timeout-shaped failure.
pub fn fetch_pages_blocking_with<F, P>(
    urls: Vec<String>,
    config: CrawlConfig,
    make_fetcher: F,
) -> CrawlReport
where
    F: FnOnce() -> Result<P> + Send + 'static,
    P: PageFetcher + 'static,
{
    let wait = config.wait_timeout();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let report = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(async {
                match make_fetcher() {
                    Ok(fetcher) => fetch_pages(&urls, &fetcher, &config).await,
                    Err(e) => CrawlReport::error(format!("Failed to initialize fetcher: {e}")),
                }
            }),
            Err(e) => CrawlReport::error(format!("Failed to build crawl runtime: {e}")),
        };
        // Receiver may be gone if the caller already timed out
        let _ = tx.send(report);
    });

    match rx.recv_timeout(wait) {
        Ok(report) => report,
        Err(_) => {
            tracing::warn!(wait_secs = wait.as_secs(), "Crawl abandoned after wait bound");
            CrawlReport::error(format!(
                "Crawl timed out after {}s and was abandoned",
                wait.as_secs()
            ))
        }
    }
}

/// Truncate to at most `max_bytes`, never splitting a UTF-8 char
pub(crate) fn truncate_to_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
