use crate::types::{CategorySelector, SearchReport, SearchResult, StageStatus};
use anyhow::Result;
use chrono::Utc;
use url::Url;

/// Keywords counted toward a result's relevance score, one point each
pub const RELEVANCE_KEYWORDS: [&str; 6] = [
    "disaster",
    "india",
    "alert",
    "warning",
    "emergency",
    "relief",
];

/// Snippets are capped at this many characters
const SNIPPET_CHARS: usize = 200;

/// Trait for web search providers (to allow mocking)
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<ProviderResult>>;
}

/// A single raw result from a search provider
#[derive(Debug, Clone)]
pub struct ProviderResult {
    pub url: String,
    pub title: String,
    pub body: String,
}

/// Run seed-query discovery for a disaster category.
///
/// An unknown category is a stage error naming the invalid input. A failed
/// provider call for one seed query is logged and skipped; the remaining
/// queries still run. Results are ranked by relevance score, descending,
/// with discovery order preserved for equal scores.
pub async fn discover_sources(
    category: &str,
    max_results: usize,
    provider: &impl SearchProvider,
) -> SearchReport {
    let Some(selector) = CategorySelector::parse(category) else {
        return SearchReport::error(
            category,
            format!(
                "Unknown disaster category: {category}. Valid categories: \
                 floods, droughts, cyclones, earthquakes, landslides, all"
            ),
        );
    };

    tracing::info!(
        category = %selector.label(),
        max_results,
        "Starting seed-query discovery"
    );

    let mut results = Vec::new();

    for disaster in selector.categories() {
        for query in disaster.seed_queries() {
            let found = match provider.search(query, max_results).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(query = %query, error = %e, "Seed query failed, skipping");
                    continue;
                }
            };

            for raw in found {
                let relevance_score = relevance_score(&raw.title, &raw.body);
                results.push(SearchResult {
                    domain: domain_of(&raw.url),
                    url: raw.url,
                    title: raw.title,
                    snippet: raw.body.chars().take(SNIPPET_CHARS).collect(),
                    source_query: (*query).to_string(),
                    relevance_score,
                    discovered_at: Utc::now(),
                });
            }
        }
    }

    // Stable sort: equal scores keep discovery order
    results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

    tracing::info!(
        category = %selector.label(),
        result_count = results.len(),
        "Seed-query discovery completed"
    );

    SearchReport {
        status: StageStatus::Success,
        category: selector.label().to_string(),
        total_count: results.len(),
        results,
        note: None,
        generated_at: Utc::now(),
    }
}

/// Offline variant returning the canned fixture, for use when no network or
/// provider credentials are available.
pub fn discover_sources_mock(category: &str, max_results: usize) -> SearchReport {
    let Some(selector) = CategorySelector::parse(category) else {
        return SearchReport::error(
            category,
            format!(
                "Unknown disaster category: {category}. Valid categories: \
                 floods, droughts, cyclones, earthquakes, landslides, all"
            ),
        );
    };

    let results: Vec<SearchResult> = mock_results(selector.label())
        .into_iter()
        .take(max_results)
        .collect();

    SearchReport {
        status: StageStatus::Success,
        category: selector.label().to_string(),
        total_count: results.len(),
        results,
        note: Some("Using mock data (network unavailable)".to_string()),
        generated_at: Utc::now(),
    }
}

/// Count how many relevance keywords appear in the title or snippet,
/// case-insensitive, one point per keyword regardless of frequency.
pub fn relevance_score(title: &str, body: &str) -> u32 {
    let haystack = format!("{} {}", title.to_lowercase(), body.to_lowercase());
    RELEVANCE_KEYWORDS
        .iter()
        .filter(|keyword| haystack.contains(**keyword))
        .count() as u32
}

fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

fn mock_results(category: &str) -> Vec<SearchResult> {
    let now = Utc::now();
    vec![
        SearchResult {
            url: "https://www.ndma.gov.in/disaster-management/floods".to_string(),
            title: "India Floods: NDMA Emergency Response and Relief Operations".to_string(),
            domain: "www.ndma.gov.in".to_string(),
            snippet: "The National Disaster Management Authority (NDMA) has issued flood \
                      warnings for multiple states. Emergency relief operations are underway \
                      in Kerala, Maharashtra, and West Bengal."
                .to_string(),
            source_query: format!("India {category} latest news"),
            relevance_score: 5,
            discovered_at: now,
        },
        SearchResult {
            url: "https://www.thehindu.com/news/national/floods-india-2024".to_string(),
            title: "Major Flooding Reported Across India: Thousands Displaced".to_string(),
            domain: "www.thehindu.com".to_string(),
            snippet: "Heavy monsoon rains have caused severe flooding in India with thousands \
                      evacuated. Disaster management teams are on alert across multiple states."
                .to_string(),
            source_query: format!("India {category} disaster updates"),
            relevance_score: 4,
            discovered_at: now,
        },
        SearchResult {
            url: "https://www.imd.gov.in/weather-warnings".to_string(),
            title: "India Meteorological Department: Severe Weather Alert".to_string(),
            domain: "www.imd.gov.in".to_string(),
            snippet: "IMD issues red alert for cyclone warning in Bay of Bengal. Coastal areas \
                      of Odisha and Andhra Pradesh on high alert. Emergency preparedness \
                      measures activated."
                .to_string(),
            source_query: format!("India {category} affected areas"),
            relevance_score: 4,
            discovered_at: now,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Provider serving canned results per query, optionally failing some
    struct MockProvider {
        by_query: HashMap<&'static str, Vec<ProviderResult>>,
        fail_queries: Vec<&'static str>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                by_query: HashMap::new(),
                fail_queries: Vec::new(),
            }
        }

        fn with(mut self, query: &'static str, results: Vec<ProviderResult>) -> Self {
            self.by_query.insert(query, results);
            self
        }

        fn failing_on(mut self, query: &'static str) -> Self {
            self.fail_queries.push(query);
            self
        }
    }

    #[async_trait::async_trait]
    impl SearchProvider for MockProvider {
        async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<ProviderResult>> {
            if self.fail_queries.contains(&query) {
                anyhow::bail!("provider unavailable for '{query}'");
            }
            Ok(self.by_query.get(query).cloned().unwrap_or_default())
        }
    }

    fn result(url: &str, title: &str, body: &str) -> ProviderResult {
        ProviderResult {
            url: url.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_category_is_an_error_naming_it() {
        let provider = MockProvider::new();
        let report = discover_sources("volcanoes", 5, &provider).await;

        match report.status {
            StageStatus::Error(message) => assert!(message.contains("volcanoes")),
            StageStatus::Success => panic!("expected error status"),
        }
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn results_are_sorted_by_relevance_descending() {
        let provider = MockProvider::new().with(
            "India floods latest news",
            vec![
                result("https://a.example", "weather report", "nothing special"),
                result(
                    "https://b.example",
                    "India disaster alert",
                    "emergency relief warning issued",
                ),
                result("https://c.example", "India flood", "monsoon rains"),
            ],
        );

        let report = discover_sources("floods", 5, &provider).await;

        assert!(report.status.is_success());
        let scores: Vec<u32> = report.results.iter().map(|r| r.relevance_score).collect();
        assert_eq!(scores, vec![6, 1, 0]);
        assert_eq!(report.results[0].url, "https://b.example");
    }

    #[tokio::test]
    async fn equal_scores_keep_discovery_order() {
        let provider = MockProvider::new().with(
            "India floods latest news",
            vec![
                result("https://first.example", "India news", "rain"),
                result("https://second.example", "India update", "rain"),
            ],
        );

        let report = discover_sources("floods", 5, &provider).await;

        assert_eq!(report.results[0].url, "https://first.example");
        assert_eq!(report.results[1].url, "https://second.example");
    }

    #[tokio::test]
    async fn failed_seed_query_is_skipped_not_fatal() {
        let provider = MockProvider::new()
            .failing_on("India floods latest news")
            .with(
                "India flood disaster updates",
                vec![result("https://ok.example", "India flood alert", "relief")],
            );

        let report = discover_sources("floods", 5, &provider).await;

        assert!(report.status.is_success());
        assert_eq!(report.total_count, 1);
        assert_eq!(report.results[0].url, "https://ok.example");
    }

    #[tokio::test]
    async fn score_counts_presence_not_frequency() {
        assert_eq!(relevance_score("nothing here", "still nothing"), 0);
        assert_eq!(
            relevance_score(
                "Disaster in India: ALERT",
                "warning warning warning, emergency relief"
            ),
            6
        );
        // Repeats of one keyword score a single point
        assert_eq!(relevance_score("alert alert alert", ""), 1);
    }

    #[tokio::test]
    async fn snippet_is_capped_at_200_chars() {
        let long_body = "x".repeat(400);
        let provider = MockProvider::new().with(
            "India floods latest news",
            vec![result("https://long.example", "title", &long_body)],
        );

        let report = discover_sources("floods", 5, &provider).await;
        assert_eq!(report.results[0].snippet.chars().count(), 200);
    }

    #[test]
    fn mock_discovery_honors_max_results() {
        let report = discover_sources_mock("floods", 2);
        assert!(report.status.is_success());
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.total_count, 2);
        assert!(report.note.is_some());
    }

    #[test]
    fn mock_discovery_rejects_unknown_category() {
        let report = discover_sources_mock("asteroids", 2);
        assert!(!report.status.is_success());
    }
}
