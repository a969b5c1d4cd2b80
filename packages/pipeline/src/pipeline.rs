//! End-to-end chaining of the four stages: search -> crawl -> extract ->
//! packets. Each stage is still a pure function over the previous stage's
//! output; this module only sequences them and keeps every intermediate
//! report visible to the caller.

use crate::config::{CrawlConfig, PacketConfig};
use crate::crawler::{fetch_pages, PageFetcher};
use crate::extractor::extract_structured;
use crate::packets::build_packets;
use crate::search::{discover_sources, SearchProvider};
use crate::types::{CrawlReport, CrawlStatus, ExtractionReport, PacketBatch, SearchReport};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All stage outputs for one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub category: String,
    pub search: SearchReport,
    pub crawl: CrawlReport,
    pub extractions: Vec<ExtractionReport>,
    pub packets: PacketBatch,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Run the full collection pipeline for one category.
///
/// A search error short-circuits into an empty crawl and zero packets, but
/// the run always completes and carries the per-stage reports.
pub async fn collect_disaster_data(
    category: &str,
    max_results: usize,
    provider: &impl SearchProvider,
    fetcher: &impl PageFetcher,
    crawl_config: &CrawlConfig,
    packet_config: &PacketConfig,
) -> PipelineRun {
    let started_at = Utc::now();

    let search = discover_sources(category, max_results, provider).await;
    let urls = search.urls();

    let crawl = fetch_pages(&urls, fetcher, crawl_config).await;

    let extractions: Vec<ExtractionReport> = crawl
        .records
        .iter()
        .filter(|record| record.status == CrawlStatus::Success)
        .map(|record| extract_structured(&record.html, Some(&record.url)))
        .collect();

    let packets = build_packets(&search, Some(&crawl), &extractions, packet_config);

    tracing::info!(
        category = %category,
        discovered = search.total_count,
        crawled = crawl.success_count,
        extracted = extractions.len(),
        packets = packets.packet_count,
        "Pipeline run completed"
    );

    PipelineRun {
        category: category.to_string(),
        search,
        crawl,
        extractions,
        packets,
        started_at,
        finished_at: Utc::now(),
    }
}
