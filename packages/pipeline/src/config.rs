use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the crawl stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Byte budget for stored HTML and markdown, applied per page
    pub content_byte_budget: usize,
    /// Cap on extracted links kept per page
    pub max_links: usize,
    /// Accepted for parity with the crawl interface; only depth 1 is fetched
    pub max_depth: u32,
    /// Upper wait bound for the blocking entry point, in seconds. The crawl
    /// is abandoned and reported as a timeout failure once this elapses.
    pub wait_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            content_byte_budget: 5000,
            max_links: 20,
            max_depth: 1,
            wait_timeout_secs: 120,
        }
    }
}

impl CrawlConfig {
    pub fn with_content_byte_budget(mut self, budget: usize) -> Self {
        self.content_byte_budget = budget;
        self
    }

    pub fn with_max_links(mut self, max_links: usize) -> Self {
        self.max_links = max_links;
        self
    }

    pub fn with_wait_timeout_secs(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = secs;
        self
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// Configuration for the packet-builder stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacketConfig {
    /// Queue topic stamped on every packet
    pub topic: String,
    /// Relevance score above which a packet is marked high priority
    pub priority_threshold: u32,
    /// Retention period handed to the downstream consumer
    pub retention_days: u32,
}

impl Default for PacketConfig {
    fn default() -> Self {
        Self {
            topic: "disaster-data-ingestion".to_string(),
            priority_threshold: 3,
            retention_days: 365,
        }
    }
}

impl PacketConfig {
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn with_priority_threshold(mut self, threshold: u32) -> Self {
        self.priority_threshold = threshold;
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention_days = days;
        self
    }
}
