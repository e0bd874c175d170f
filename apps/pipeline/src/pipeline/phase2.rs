//! Phase 2: stability analysis and company enrichment over the same raw
//! experience, run side by side. Neither branch can fail the phase.

use std::time::Instant;

use tracing::info;

use crate::enrichment::CompanyEnricher;
use crate::models::candidate::{EnrichedCompanyRecord, RawCompanyRecord, StabilityRecord};
use crate::tenure::dates::DateNormalizer;
use crate::tenure::stability::StabilityAnalyzer;

pub async fn run_phase2(
    analyzer: &StabilityAnalyzer,
    enricher: &CompanyEnricher,
    records: &[RawCompanyRecord],
    dates: &DateNormalizer,
) -> (StabilityRecord, Vec<EnrichedCompanyRecord>) {
    let started = Instant::now();

    let (stability, enriched) = tokio::join!(analyzer.analyze(records, dates), enricher.enrich(records));

    info!(
        companies = records.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Phase 2 complete"
    );
    (stability, enriched)
}
