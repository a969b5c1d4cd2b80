//! Structured extraction from raw HTML: titles, headings, paragraphs,
//! tables, and lists, plus lexical tagging of dates, Indian locations, and
//! disaster keywords. Matching is purely lexical: no deduplication, no
//! confidence scoring, and no negative matching ("flood insurance" tags the
//! same as an actual flood report).

use crate::types::{
    ExtractionReport, ExtractionResult, Heading, ListBlock, StageStatus, TableData,
};
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    // Numeric dates: 12/08/2024, 3-1-24
    static ref NUMERIC_DATE: Regex = Regex::new(
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b"
    ).unwrap();

    // Month-name dates: Aug 15, 2024 / August 15 2024
    static ref MONTH_DATE: Regex = Regex::new(
        r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)[a-z]* \d{1,2},? \d{4}\b"
    ).unwrap();
}

/// Indian states and major cities checked by case-insensitive containment
pub const INDIAN_LOCATIONS: [&str; 34] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Delhi",
    "Mumbai",
    "Kolkata",
    "Chennai",
    "Bangalore",
    "Hyderabad",
];

/// Disaster event keywords checked the same way
pub const DISASTER_KEYWORDS: [&str; 11] = [
    "flood",
    "drought",
    "cyclone",
    "earthquake",
    "landslide",
    "tsunami",
    "disaster",
    "emergency",
    "relief",
    "evacuation",
    "casualties",
];

/// Paragraphs at or below this many characters are dropped
const MIN_PARAGRAPH_CHARS: usize = 20;

/// Parse one HTML document into structured fields and tag entities
pub fn extract_structured(html: &str, url: Option<&str>) -> ExtractionReport {
    let document = Html::parse_document(html);

    let mut extracted = ExtractionResult {
        title: element_text(&document, "title"),
        ..Default::default()
    };

    for level in 1..=4u8 {
        if let Ok(selector) = Selector::parse(&format!("h{level}")) {
            for heading in document.select(&selector) {
                let text = collect_text(heading);
                if !text.is_empty() {
                    extracted.headings.push(Heading { level, text });
                }
            }
        }
    }

    if let Ok(selector) = Selector::parse("p") {
        for paragraph in document.select(&selector) {
            let text = collect_text(paragraph);
            if text.chars().count() > MIN_PARAGRAPH_CHARS {
                extracted.paragraphs.push(text);
            }
        }
    }

    if let Ok(selector) = Selector::parse("table") {
        for table in document.select(&selector) {
            extracted.tables.push(extract_table(table));
        }
    }

    if let Ok(selector) = Selector::parse("ul, ol") {
        for list in document.select(&selector) {
            let items = child_texts(list, "li");
            if !items.is_empty() {
                extracted.lists.push(ListBlock {
                    kind: list.value().name().to_string(),
                    items,
                });
            }
        }
    }

    let full_text = document.root_element().text().collect::<String>();
    let full_lower = full_text.to_lowercase();

    for pattern in [&*NUMERIC_DATE, &*MONTH_DATE] {
        extracted
            .dates
            .extend(pattern.find_iter(&full_text).map(|m| m.as_str().to_string()));
    }

    for location in INDIAN_LOCATIONS {
        if full_lower.contains(&location.to_lowercase()) {
            extracted.locations.push(location.to_string());
        }
    }

    for keyword in DISASTER_KEYWORDS {
        if full_lower.contains(keyword) {
            extracted.event_keywords.push(keyword.to_string());
        }
    }

    tracing::debug!(
        url = url.unwrap_or("<inline>"),
        paragraph_count = extracted.paragraphs.len(),
        table_count = extracted.tables.len(),
        date_count = extracted.dates.len(),
        "Extraction completed"
    );

    ExtractionReport {
        status: StageStatus::Success,
        url: url.map(str::to_string),
        extracted,
        generated_at: Utc::now(),
    }
}

fn extract_table(table: ElementRef<'_>) -> TableData {
    let mut data = TableData::default();

    if let Ok(selector) = Selector::parse("caption") {
        data.caption = table
            .select(&selector)
            .next()
            .map(collect_text)
            .filter(|t| !t.is_empty());
    }

    data.headers = child_texts(table, "th");

    if let Ok(row_selector) = Selector::parse("tr") {
        for row in table.select(&row_selector) {
            let cells = child_texts(row, "td, th");
            if !cells.is_empty() {
                data.rows.push(cells);
            }
        }
    }

    data
}

fn element_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(collect_text)
        .filter(|t| !t.is_empty())
}

fn collect_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn child_texts(element: ElementRef<'_>, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    element
        .select(&selector)
        .map(collect_text)
        .filter(|t| !t.is_empty())
        .collect()
}
