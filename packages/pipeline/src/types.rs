use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Schema version stamped on every packet
pub const SCHEMA_VERSION: &str = "1.0";

/// Outcome of a pipeline stage. Stages never return `Err` to the caller;
/// failures are reported inside the stage's own output object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "message")]
pub enum StageStatus {
    Success,
    Error(String),
}

impl StageStatus {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// The fixed set of disaster categories the pipeline covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterCategory {
    Floods,
    Droughts,
    Cyclones,
    Earthquakes,
    Landslides,
}

impl DisasterCategory {
    pub const ALL: [DisasterCategory; 5] = [
        Self::Floods,
        Self::Droughts,
        Self::Cyclones,
        Self::Earthquakes,
        Self::Landslides,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Floods => "floods",
            Self::Droughts => "droughts",
            Self::Cyclones => "cyclones",
            Self::Earthquakes => "earthquakes",
            Self::Landslides => "landslides",
        }
    }

    /// Hand-authored seed queries that bootstrap discovery for this category
    pub fn seed_queries(&self) -> &'static [&'static str] {
        match self {
            Self::Floods => &[
                "India floods latest news",
                "India flood disaster updates",
                "India monsoon flooding",
                "India flood affected areas",
            ],
            Self::Droughts => &[
                "India drought conditions",
                "India water scarcity news",
                "India drought affected regions",
                "India rainfall deficit",
            ],
            Self::Cyclones => &[
                "India cyclone latest update",
                "India tropical cyclone warning",
                "India Bay of Bengal cyclone",
                "India Arabian Sea cyclone",
            ],
            Self::Earthquakes => &[
                "India earthquake latest news",
                "India seismic activity",
                "India earthquake tremors",
                "India earthquake affected areas",
            ],
            Self::Landslides => &[
                "India landslide news",
                "India hill slope failure",
                "India landslide disaster",
                "India monsoon landslides",
            ],
        }
    }
}

impl fmt::Display for DisasterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category selection for a search run: a single category or all of them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySelector {
    All,
    One(DisasterCategory),
}

impl CategorySelector {
    /// Parse a user-supplied category label. Returns `None` for anything
    /// outside the fixed set.
    pub fn parse(input: &str) -> Option<Self> {
        if input.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        DisasterCategory::ALL
            .into_iter()
            .find(|c| input.eq_ignore_ascii_case(c.as_str()))
            .map(Self::One)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::One(c) => c.as_str(),
        }
    }

    pub fn categories(&self) -> Vec<DisasterCategory> {
        match self {
            Self::All => DisasterCategory::ALL.to_vec(),
            Self::One(c) => vec![*c],
        }
    }
}

/// A ranked candidate URL discovered by the seed-query search stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub snippet: String,
    pub source_query: String,
    pub relevance_score: u32,
    pub discovered_at: DateTime<Utc>,
}

/// Output of the seed-query search stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub status: StageStatus,
    pub category: String,
    pub results: Vec<SearchResult>,
    pub total_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl SearchReport {
    pub fn error(category: &str, message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::error(message),
            category: category.to_string(),
            results: Vec::new(),
            total_count: 0,
            note: None,
            generated_at: Utc::now(),
        }
    }

    /// The discovered URL list, in ranked order
    pub fn urls(&self) -> Vec<String> {
        self.results.iter().map(|r| r.url.clone()).collect()
    }
}

/// Per-URL crawl outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    Success,
    Error,
}

/// One crawled page, truncated to the configured budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlRecord {
    pub url: String,
    pub status: CrawlStatus,
    pub html: String,
    pub markdown: String,
    pub links: Vec<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Size of the fetched HTML before truncation
    pub content_size_bytes: usize,
    pub crawled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CrawlRecord {
    pub fn error(url: &str, message: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status: CrawlStatus::Error,
            html: String::new(),
            markdown: String::new(),
            links: Vec::new(),
            title: None,
            description: None,
            content_size_bytes: 0,
            crawled_at: Utc::now(),
            error_message: Some(message.into()),
        }
    }
}

/// Output of the crawl stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub status: StageStatus,
    pub records: Vec<CrawlRecord>,
    pub success_count: usize,
    pub error_count: usize,
    pub total_size_bytes: usize,
    pub generated_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::error(message),
            records: Vec::new(),
            success_count: 0,
            error_count: 0,
            total_size_bytes: 0,
            generated_at: Utc::now(),
        }
    }

    /// Look up a record by exact URL string equality
    pub fn find(&self, url: &str) -> Option<&CrawlRecord> {
        self.records.iter().find(|r| r.url == url)
    }
}

/// A heading captured from a document, h1 through h4
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// A table captured as ordered row lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TableData {
    pub caption: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// An ordered or unordered list captured from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlock {
    /// Tag name the list came from: "ul" or "ol"
    pub kind: String,
    pub items: Vec<String>,
}

/// Structured fields parsed from one HTML document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: Option<String>,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub tables: Vec<TableData>,
    pub lists: Vec<ListBlock>,
    pub dates: Vec<String>,
    pub locations: Vec<String>,
    pub event_keywords: Vec<String>,
}

/// Output of the extraction stage for one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub extracted: ExtractionResult,
    pub generated_at: DateTime<Utc>,
}

/// Enrichment state carried inside a packet's content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentStatus {
    Pending,
    Success,
    Error,
}

impl From<CrawlStatus> for EnrichmentStatus {
    fn from(status: CrawlStatus) -> Self {
        match status {
            CrawlStatus::Success => Self::Success,
            CrawlStatus::Error => Self::Error,
        }
    }
}

/// Where a packet's data came from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketSource {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub discovered_at: DateTime<Utc>,
}

/// Search metadata carried alongside a packet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketMetadata {
    pub disaster_type: String,
    pub source_query: String,
    pub relevance_score: u32,
}

/// Payload of a packet: the snippet plus whatever enrichment matched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketContent {
    pub snippet: String,
    pub crawl_status: EnrichmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawled_size_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawled_at: Option<DateTime<Utc>>,
    pub extraction_status: EnrichmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<ExtractionResult>,
}

/// Downstream processing priority, derived from the relevance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Normal,
}

/// Instructions for the downstream consumer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingInstructions {
    pub priority: Priority,
    pub requires_crawl: bool,
    pub requires_extraction: bool,
    pub retention_days: u32,
}

/// One queue-ready message packet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub packet_id: String,
    pub topic: String,
    pub schema_version: String,
    pub created_at: DateTime<Utc>,
    pub source: PacketSource,
    pub metadata: PacketMetadata,
    pub content: PacketContent,
    pub processing_instructions: ProcessingInstructions,
}

/// How the batch is meant to be published
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub topic: String,
    pub key_field: String,
    pub partition_key: String,
    pub serialization: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            topic: "disaster-data-ingestion".to_string(),
            key_field: "packet_id".to_string(),
            partition_key: "disaster_type".to_string(),
            serialization: "json".to_string(),
        }
    }
}

/// Output of the packet-builder stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketBatch {
    pub status: StageStatus,
    pub batch_id: Uuid,
    pub packets: Vec<Packet>,
    pub packet_count: usize,
    pub queue: QueueConfig,
    pub generated_at: DateTime<Utc>,
}

impl PacketBatch {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: StageStatus::error(message),
            batch_id: Uuid::now_v7(),
            packets: Vec::new(),
            packet_count: 0,
            queue: QueueConfig::default(),
            generated_at: Utc::now(),
        }
    }
}

/// Deterministic packet id derived from the category and source URL.
/// Repeated invocations over the same input produce the same id.
pub fn packet_id(disaster_type: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(disaster_type.as_bytes());
    hasher.update([0x1f]);
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    format!("disaster-{}", hex::encode(&digest[..8]))
}
