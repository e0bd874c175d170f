//! Adaptive Batch Enrichment — adds company type, business type, size, funding
//! and location to every raw company record.
//!
//! Policy:
//! - ≤ `CHUNK_SIZE` records → one extraction call for all of them (batch)
//! - more → consecutive chunks of `CHUNK_SIZE`, one call per chunk, all concurrent (chunked)
//!
//! Output has the same length and order as the input. Identity fields always
//! come from the input record. A group whose call fails, times out or is refused
//! falls back to sentinel records; other groups are unaffected.

pub mod company_facts;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

use crate::enrichment::company_facts::{is_placeholder, parse_funding, parse_headcount};
use crate::extraction::{extract_typed, Extraction, Schema, StructuredExtractor};
use crate::models::candidate::{
    CompanyDetails, CompanyFacts, EnrichedCompanyRecord, RawCompanyRecord, UNKNOWN,
};

/// Largest number of companies sent in one extraction call.
pub const CHUNK_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentMode {
    Batch,
    Chunked,
}

impl EnrichmentMode {
    pub fn for_len(len: usize) -> Self {
        if len <= CHUNK_SIZE {
            EnrichmentMode::Batch
        } else {
            EnrichmentMode::Chunked
        }
    }
}

/// One enriched company as returned by the service. Identity fields it may
/// echo back are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyEnrichment {
    #[serde(default, deserialize_with = "lenient_text")]
    pub company_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub business_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_count: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub funding: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
}

/// Strings pass through and numbers are rendered as text ("250000"). Any
/// other JSON type reads as absent, so one mistyped field cannot fail the
/// whole group.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

impl CompanyEnrichment {
    /// Normalizes placeholders: blank labels become "Unknown", placeholder
    /// headcount/funding text becomes `None`.
    pub fn into_details(self) -> CompanyDetails {
        let employee_count = self.employee_count.filter(|s| !is_placeholder(s));
        let funding = self.funding.filter(|s| !is_placeholder(s));
        let facts = CompanyFacts {
            headcount: employee_count.as_deref().and_then(parse_headcount),
            funding: funding.as_deref().and_then(parse_funding),
        };
        CompanyDetails {
            company_type: label_or_unknown(self.company_type),
            business_type: label_or_unknown(self.business_type),
            employee_count,
            funding,
            location: label_or_unknown(self.location),
            facts,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EnrichmentResponse {
    #[serde(default)]
    enriched_companies: Vec<CompanyEnrichment>,
}

pub struct CompanyEnricher {
    extractor: Arc<dyn StructuredExtractor>,
    schema: Schema,
    call_timeout: Duration,
}

impl CompanyEnricher {
    pub fn new(extractor: Arc<dyn StructuredExtractor>, schema: Schema, call_timeout: Duration) -> Self {
        Self {
            extractor,
            schema,
            call_timeout,
        }
    }

    /// Enriches every record. Never fails: unusable groups become sentinels.
    pub async fn enrich(&self, records: &[RawCompanyRecord]) -> Vec<EnrichedCompanyRecord> {
        let started = Instant::now();
        let groups = plan_groups(records.len());
        let mode = EnrichmentMode::for_len(records.len());
        info!(
            companies = records.len(),
            groups = groups.len(),
            "Enriching companies in {:?} mode",
            mode
        );

        let tasks = groups
            .into_iter()
            .enumerate()
            .map(|(index, range)| self.enrich_group(index, &records[range]));
        let enriched: Vec<EnrichedCompanyRecord> = join_all(tasks).await.into_iter().flatten().collect();

        info!(
            companies = enriched.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Company enrichment finished"
        );
        enriched
    }

    async fn enrich_group(&self, index: usize, group: &[RawCompanyRecord]) -> Vec<EnrichedCompanyRecord> {
        let payload = render_companies(group);
        let outcome =
            extract_typed::<EnrichmentResponse>(self.extractor.as_ref(), &payload, &self.schema, self.call_timeout)
                .await;

        match outcome {
            Ok(Extraction::Object(response)) => merge_group(index, group, response.enriched_companies),
            Ok(Extraction::Refusal(reason)) => {
                warn!(group = index, "Enrichment refused, using Unknown for {} companies: {reason}", group.len());
                sentinel_group(group)
            }
            Err(e) => {
                warn!(group = index, "Enrichment failed, using Unknown for {} companies: {e}", group.len());
                sentinel_group(group)
            }
        }
    }
}

/// Index ranges for each extraction call: `[0..n]` for n ≤ 3, otherwise
/// consecutive chunks of 3 with a shorter tail.
pub fn plan_groups(len: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    (0..len)
        .step_by(CHUNK_SIZE)
        .map(|start| start..(start + CHUNK_SIZE).min(len))
        .collect()
}

/// Aligns returned entries to the group by index. Extra entries are dropped,
/// missing ones become sentinels; both cases are logged.
pub fn merge_group(
    index: usize,
    group: &[RawCompanyRecord],
    returned: Vec<CompanyEnrichment>,
) -> Vec<EnrichedCompanyRecord> {
    if returned.len() != group.len() {
        warn!(
            group = index,
            expected = group.len(),
            received = returned.len(),
            "Enrichment count mismatch, aligning by index"
        );
    }

    let mut returned = returned.into_iter();
    group
        .iter()
        .map(|raw| match returned.next() {
            Some(enrichment) => EnrichedCompanyRecord::from_raw(raw, enrichment.into_details()),
            None => EnrichedCompanyRecord::sentinel(raw),
        })
        .collect()
}

pub fn sentinel_group(group: &[RawCompanyRecord]) -> Vec<EnrichedCompanyRecord> {
    group.iter().map(EnrichedCompanyRecord::sentinel).collect()
}

/// Numbered company list with positions, used as the extraction payload.
pub fn render_companies(records: &[RawCompanyRecord]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut block = format!("{}. {}", i + 1, record.company_name);
            for stint in &record.positions {
                block.push_str(&format!(
                    "\n    - {}: {} to {}",
                    stint.title,
                    stint.start.as_str(),
                    stint.end.as_str()
                ));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn label_or_unknown(label: Option<String>) -> String {
    match label {
        Some(label) if !label.trim().is_empty() => label.trim().to_string(),
        _ => UNKNOWN.to_string(),
    }
}
