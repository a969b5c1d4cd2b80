use crate::config::PacketConfig;
use crate::types::{
    packet_id, CrawlReport, EnrichmentStatus, ExtractionReport, Packet, PacketBatch,
    PacketContent, PacketMetadata, PacketSource, Priority, ProcessingInstructions, QueueConfig,
    SearchReport, StageStatus, SCHEMA_VERSION,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Malformed JSON handed to the packet builder
#[derive(Debug, Error)]
pub enum PacketInputError {
    #[error("malformed search results: {0}")]
    Search(serde_json::Error),
    #[error("malformed crawl results: {0}")]
    Crawl(serde_json::Error),
    #[error("malformed extraction results: {0}")]
    Extraction(serde_json::Error),
}

/// Assemble one queue-ready packet per discovered URL.
///
/// Crawl enrichment requires an exact URL string match; unmatched packets
/// keep `crawl_status: pending`. Extraction enrichment is resolved through
/// a per-URL map; an extraction carrying no source URL is treated as
/// batch-shared and applied to every packet.
pub fn build_packets(
    search: &SearchReport,
    crawl: Option<&CrawlReport>,
    extractions: &[ExtractionReport],
    config: &PacketConfig,
) -> PacketBatch {
    let mut by_url: HashMap<&str, &ExtractionReport> = HashMap::new();
    let mut shared: Option<&ExtractionReport> = None;
    for report in extractions {
        match report.url.as_deref() {
            Some(url) if !url.is_empty() => {
                by_url.insert(url, report);
            }
            _ => shared = Some(report),
        }
    }

    let mut packets = Vec::with_capacity(search.results.len());

    for result in &search.results {
        let mut content = PacketContent {
            snippet: result.snippet.clone(),
            crawl_status: EnrichmentStatus::Pending,
            crawled_size_bytes: None,
            crawled_at: None,
            extraction_status: EnrichmentStatus::Pending,
            structured: None,
        };

        if let Some(record) = crawl.and_then(|c| c.find(&result.url)) {
            content.crawl_status = record.status.into();
            content.crawled_size_bytes = Some(record.content_size_bytes);
            content.crawled_at = Some(record.crawled_at);
        }

        if let Some(report) = by_url.get(result.url.as_str()).copied().or(shared) {
            content.extraction_status = if report.status.is_success() {
                EnrichmentStatus::Success
            } else {
                EnrichmentStatus::Error
            };
            content.structured = Some(report.extracted.clone());
        }

        let priority = if result.relevance_score > config.priority_threshold {
            Priority::High
        } else {
            Priority::Normal
        };

        packets.push(Packet {
            packet_id: packet_id(&search.category, &result.url),
            topic: config.topic.clone(),
            schema_version: SCHEMA_VERSION.to_string(),
            created_at: Utc::now(),
            source: PacketSource {
                url: result.url.clone(),
                domain: result.domain.clone(),
                title: result.title.clone(),
                discovered_at: result.discovered_at,
            },
            metadata: PacketMetadata {
                disaster_type: search.category.clone(),
                source_query: result.source_query.clone(),
                relevance_score: result.relevance_score,
            },
            content,
            processing_instructions: ProcessingInstructions {
                priority,
                requires_crawl: true,
                requires_extraction: true,
                retention_days: config.retention_days,
            },
        });
    }

    tracing::info!(
        category = %search.category,
        packet_count = packets.len(),
        "Packet batch assembled"
    );

    PacketBatch {
        status: StageStatus::Success,
        batch_id: Uuid::now_v7(),
        packet_count: packets.len(),
        packets,
        queue: QueueConfig {
            topic: config.topic.clone(),
            ..QueueConfig::default()
        },
        generated_at: Utc::now(),
    }
}

/// JSON entry point: each stage output is optional and independent.
/// Malformed JSON yields an error batch with no packets.
pub fn build_packets_from_json(
    search_json: Option<&str>,
    crawl_json: Option<&str>,
    extraction_json: Option<&str>,
    config: &PacketConfig,
) -> PacketBatch {
    match parse_inputs(search_json, crawl_json, extraction_json) {
        Ok((search, crawl, extractions)) => match search {
            Some(search) => build_packets(&search, crawl.as_ref(), &extractions, config),
            None => PacketBatch {
                status: StageStatus::Success,
                batch_id: Uuid::now_v7(),
                packets: Vec::new(),
                packet_count: 0,
                queue: QueueConfig {
                    topic: config.topic.clone(),
                    ..QueueConfig::default()
                },
                generated_at: Utc::now(),
            },
        },
        Err(e) => {
            tracing::warn!(error = %e, "Rejecting malformed packet-builder input");
            PacketBatch::error(e.to_string())
        }
    }
}

type ParsedInputs = (
    Option<SearchReport>,
    Option<CrawlReport>,
    Vec<ExtractionReport>,
);

fn parse_inputs(
    search_json: Option<&str>,
    crawl_json: Option<&str>,
    extraction_json: Option<&str>,
) -> Result<ParsedInputs, PacketInputError> {
    let search = search_json
        .map(serde_json::from_str)
        .transpose()
        .map_err(PacketInputError::Search)?;

    let crawl = crawl_json
        .map(serde_json::from_str)
        .transpose()
        .map_err(PacketInputError::Crawl)?;

    // A single report and a report list are both accepted
    let extractions = match extraction_json {
        Some(json) => match serde_json::from_str::<Vec<ExtractionReport>>(json) {
            Ok(list) => list,
            Err(_) => vec![serde_json::from_str::<ExtractionReport>(json)
                .map_err(PacketInputError::Extraction)?],
        },
        None => Vec::new(),
    };

    Ok((search, crawl, extractions))
}

/// Display/export summary for a built batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub status: StageStatus,
    pub total_packets: usize,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_packet: Option<Packet>,
    pub queue: QueueConfig,
}

pub fn summarize_batch(batch: &PacketBatch) -> BatchSummary {
    BatchSummary {
        status: batch.status.clone(),
        total_packets: batch.packet_count,
        summary: format!(
            "Generated {} message packets ready for ingestion",
            batch.packet_count
        ),
        sample_packet: batch.packets.first().cloned(),
        queue: batch.queue.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_structured;
    use crate::types::{CrawlRecord, CrawlStatus, SearchResult};

    fn search_report(scores: &[u32]) -> SearchReport {
        let results = scores
            .iter()
            .enumerate()
            .map(|(i, &score)| SearchResult {
                url: format!("https://site{i}.example/article"),
                title: format!("Result {i}"),
                domain: format!("site{i}.example"),
                snippet: "flood update".to_string(),
                source_query: "India floods latest news".to_string(),
                relevance_score: score,
                discovered_at: Utc::now(),
            })
            .collect::<Vec<_>>();

        SearchReport {
            status: StageStatus::Success,
            category: "floods".to_string(),
            total_count: results.len(),
            results,
            note: None,
            generated_at: Utc::now(),
        }
    }

    fn crawl_report_for(url: &str) -> CrawlReport {
        CrawlReport {
            status: StageStatus::Success,
            records: vec![CrawlRecord {
                url: url.to_string(),
                status: CrawlStatus::Success,
                html: "<html></html>".to_string(),
                markdown: String::new(),
                links: Vec::new(),
                title: None,
                description: None,
                content_size_bytes: 1234,
                crawled_at: Utc::now(),
                error_message: None,
            }],
            success_count: 1,
            error_count: 0,
            total_size_bytes: 1234,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn packet_count_matches_discovered_urls() {
        let config = PacketConfig::default();
        for n in [0usize, 1, 5] {
            let search = search_report(&vec![2; n]);
            let batch = build_packets(&search, None, &[], &config);
            assert_eq!(batch.packet_count, n);
            assert_eq!(batch.packets.len(), n);
        }
    }

    #[test]
    fn priority_is_high_strictly_above_threshold() {
        let search = search_report(&[3, 4]);
        let batch = build_packets(&search, None, &[], &PacketConfig::default());

        assert_eq!(
            batch.packets[0].processing_instructions.priority,
            Priority::Normal
        );
        assert_eq!(
            batch.packets[1].processing_instructions.priority,
            Priority::High
        );
    }

    #[test]
    fn crawl_enrichment_requires_exact_url_match() {
        let search = search_report(&[2, 2]);
        let crawl = crawl_report_for(&search.results[0].url);

        let batch = build_packets(&search, Some(&crawl), &[], &PacketConfig::default());

        assert_eq!(batch.packets[0].content.crawl_status, EnrichmentStatus::Success);
        assert_eq!(batch.packets[0].content.crawled_size_bytes, Some(1234));
        assert_eq!(batch.packets[1].content.crawl_status, EnrichmentStatus::Pending);
        assert_eq!(batch.packets[1].content.crawled_size_bytes, None);
    }

    #[test]
    fn url_keyed_extraction_enriches_only_its_packet() {
        let search = search_report(&[2, 2]);
        let extraction = extract_structured(
            "<html><body><p>Flooding reported across Kerala districts today.</p></body></html>",
            Some(&search.results[0].url),
        );

        let batch = build_packets(&search, None, &[extraction], &PacketConfig::default());

        assert_eq!(
            batch.packets[0].content.extraction_status,
            EnrichmentStatus::Success
        );
        assert!(batch.packets[0].content.structured.is_some());
        assert_eq!(
            batch.packets[1].content.extraction_status,
            EnrichmentStatus::Pending
        );
        assert!(batch.packets[1].content.structured.is_none());
    }

    #[test]
    fn url_less_extraction_is_batch_shared() {
        let search = search_report(&[2, 2]);
        let extraction = extract_structured(
            "<html><body><p>Flooding reported across Kerala districts today.</p></body></html>",
            None,
        );

        let batch = build_packets(&search, None, &[extraction], &PacketConfig::default());

        for packet in &batch.packets {
            assert_eq!(packet.content.extraction_status, EnrichmentStatus::Success);
            assert!(packet.content.structured.is_some());
        }
    }

    #[test]
    fn packet_ids_are_stable_across_invocations() {
        let search = search_report(&[2]);
        let config = PacketConfig::default();

        let first = build_packets(&search, None, &[], &config);
        let second = build_packets(&search, None, &[], &config);

        assert_eq!(first.packets[0].packet_id, second.packets[0].packet_id);
    }

    #[test]
    fn malformed_json_yields_error_batch_with_no_packets() {
        let batch = build_packets_from_json(
            Some("{not json"),
            None,
            None,
            &PacketConfig::default(),
        );

        assert!(!batch.status.is_success());
        assert!(batch.packets.is_empty());
        assert_eq!(batch.packet_count, 0);
    }

    #[test]
    fn json_entry_point_round_trips_stage_outputs() {
        let search = search_report(&[4]);
        let crawl = crawl_report_for(&search.results[0].url);
        let search_json = serde_json::to_string(&search).unwrap();
        let crawl_json = serde_json::to_string(&crawl).unwrap();

        let batch = build_packets_from_json(
            Some(&search_json),
            Some(&crawl_json),
            None,
            &PacketConfig::default(),
        );

        assert!(batch.status.is_success());
        assert_eq!(batch.packet_count, 1);
        assert_eq!(
            batch.packets[0].content.crawl_status,
            EnrichmentStatus::Success
        );
    }

    #[test]
    fn no_search_input_yields_empty_success_batch() {
        let batch = build_packets_from_json(None, None, None, &PacketConfig::default());
        assert!(batch.status.is_success());
        assert_eq!(batch.packet_count, 0);
    }

    #[test]
    fn summary_carries_count_and_sample() {
        let search = search_report(&[2, 3]);
        let batch = build_packets(&search, None, &[], &PacketConfig::default());

        let summary = summarize_batch(&batch);

        assert_eq!(summary.total_packets, 2);
        assert!(summary.summary.contains("2 message packets"));
        assert_eq!(
            summary.sample_packet.as_ref().map(|p| p.packet_id.clone()),
            Some(batch.packets[0].packet_id.clone())
        );
        assert_eq!(summary.queue.topic, "disaster-data-ingestion");
    }
}
