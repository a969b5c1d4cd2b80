//! HTTP page fetcher built on reqwest + scraper + htmd.
//!
//! Fetches static HTML only; no JavaScript rendering.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

use crate::crawler::{FetchedPage, PageFetcher};

/// Page fetcher using a browser-like HTTP client
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        // Browser-like User-Agent to avoid bot detection
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert(
            reqwest::header::CONNECTION,
            reqwest::header::HeaderValue::from_static("keep-alive"),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch raw HTML from a URL
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} for {}", status, url);
        }

        response.text().await.context("Failed to read response body")
    }

    fn extract_title(document: &Html) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn extract_description(document: &Html) -> Option<String> {
        let selector = Selector::parse(r#"meta[name="description"]"#).ok()?;
        document
            .select(&selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Collect absolute http/https links, deduplicated in document order
    fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
        let selector = match Selector::parse("a[href]") {
            Ok(s) => s,
            Err(_) => return vec![],
        };

        let mut seen = HashSet::new();
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .filter_map(|href| base_url.join(href).ok())
            .filter(|url| {
                (url.scheme() == "http" || url.scheme() == "https") && url.fragment().is_none()
            })
            .map(|url| url.to_string())
            .filter(|url| seen.insert(url.clone()))
            .collect()
    }

    fn html_to_markdown(html: &str) -> String {
        htmd::convert(html).unwrap_or_else(|_| {
            // Fallback: strip tags and return plain text
            let document = Html::parse_document(html);
            document.root_element().text().collect::<String>()
        })
    }

    /// Add https:// when no scheme is present
    fn normalize_url(url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let url = Self::normalize_url(url);
        tracing::debug!(url = %url, "Fetching page");

        let html = self.fetch_html(&url).await?;

        // Parse after the last await: Html is not Send
        let base_url = Url::parse(&url).context("Invalid URL")?;
        let document = Html::parse_document(&html);

        let title = Self::extract_title(&document);
        let description = Self::extract_description(&document);
        let links = Self::extract_links(&document, &base_url);
        drop(document);

        let markdown = Self::html_to_markdown(&html);

        Ok(FetchedPage {
            html,
            markdown,
            links,
            title,
            description,
        })
    }
}
