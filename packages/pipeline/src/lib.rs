//! Disaster-data collection pipeline: seed-query search, crawling,
//! structured extraction, and message-packet assembly for queue ingestion.
//!
//! Each stage is a pure function over the previous stage's output; callers
//! chain them directly or through [`pipeline::collect_disaster_data`]. No
//! stage returns `Err`; failures travel inside each stage's report object.

pub mod config;
pub mod types;

// Pipeline stages
pub mod crawler;
pub mod extractor;
pub mod packets;
pub mod pipeline;
pub mod search;

// Concrete providers
pub mod fetcher;
pub mod tavily;

// Execution-session and remote-procedure support
pub mod rpc;
pub mod session;

// Re-exports for clean API
pub use config::{CrawlConfig, PacketConfig};
pub use crawler::{
    fetch_pages, fetch_pages_blocking, fetch_pages_blocking_with, parse_url_list, FetchedPage,
    PageFetcher,
};
pub use extractor::extract_structured;
pub use fetcher::HttpFetcher;
pub use packets::{build_packets, build_packets_from_json, summarize_batch, BatchSummary};
pub use pipeline::{collect_disaster_data, PipelineRun};
pub use rpc::{DummyRpcClient, RpcOperation};
pub use search::{discover_sources, discover_sources_mock, ProviderResult, SearchProvider};
pub use session::ExecSession;
pub use tavily::{NoopSearchProvider, TavilyClient};
pub use types::{
    CategorySelector, CrawlRecord, CrawlReport, CrawlStatus, DisasterCategory, EnrichmentStatus,
    ExtractionReport, ExtractionResult, Packet, PacketBatch, Priority, QueueConfig, SearchReport,
    SearchResult, StageStatus,
};
