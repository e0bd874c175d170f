//! Stability Analyzer — tenure strings, average stability and type roll-ups.
//!
//! Tenure figures are always computed locally. Only the per-company
//! classification (type, business type, complex work) comes from the
//! extraction service, and a failed or refused call degrades it to
//! "Unknown"/false instead of failing the analysis.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{info, warn};

use crate::enrichment::render_companies;
use crate::extraction::{extract_typed, Extraction, Schema, StructuredExtractor};
use crate::models::candidate::{RawCompanyRecord, StabilityRecord, UNKNOWN};
use crate::scoring::{normalize_boolean, BoolLike};
use crate::tenure::dates::DateNormalizer;
use crate::tenure::summarize;

/// Service classification of one company.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyJudgment {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_type: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub is_complex: Option<BoolLike>,
}

impl CompanyJudgment {
    fn is_complex(&self) -> bool {
        self.is_complex.as_ref().is_some_and(normalize_boolean)
    }
}

#[derive(Debug, Deserialize)]
struct StabilityResponse {
    #[serde(default)]
    companies: Vec<CompanyJudgment>,
}

pub struct StabilityAnalyzer {
    extractor: Arc<dyn StructuredExtractor>,
    schema: Schema,
    call_timeout: Duration,
}

impl StabilityAnalyzer {
    pub fn new(extractor: Arc<dyn StructuredExtractor>, schema: Schema, call_timeout: Duration) -> Self {
        Self {
            extractor,
            schema,
            call_timeout,
        }
    }

    pub async fn analyze(&self, records: &[RawCompanyRecord], dates: &DateNormalizer) -> StabilityRecord {
        let started = Instant::now();
        let summary = summarize(records, dates);
        let companies = unique_companies(records);

        let judgments = if companies.is_empty() {
            Vec::new()
        } else {
            self.judge(&companies).await
        };
        let matched = match_judgments(&companies, &judgments);

        let record = StabilityRecord {
            per_company_tenure: summary
                .tenure
                .iter()
                .map(|t| format!("{}: {:.2} years", t.company_name, t.years))
                .collect(),
            average_stability_years: summary.average_stability_years,
            has_complex_experience: matched.iter().flatten().any(|j| j.is_complex()),
            company_type_summary: roll_up(matched.iter().map(|j| j.and_then(|j| j.company_type.as_deref()))),
            business_type_summary: roll_up(matched.iter().map(|j| j.and_then(|j| j.business_type.as_deref()))),
            total_experience_years: summary.total_experience_years,
            breakdown: summary.breakdown,
        };

        info!(
            companies = companies.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stability analysis finished"
        );
        record
    }

    async fn judge(&self, companies: &[RawCompanyRecord]) -> Vec<CompanyJudgment> {
        let payload = render_companies(companies);
        let outcome =
            extract_typed::<StabilityResponse>(self.extractor.as_ref(), &payload, &self.schema, self.call_timeout)
                .await;

        match outcome {
            Ok(Extraction::Object(response)) => response.companies,
            Ok(Extraction::Refusal(reason)) => {
                warn!("Stability classification refused, using Unknown: {reason}");
                Vec::new()
            }
            Err(e) => {
                warn!("Stability classification failed, using Unknown: {e}");
                Vec::new()
            }
        }
    }
}

/// Pairs each listed company with its judgment. An exact name wins. When the
/// service answered one entry per company, an entry whose name matches no
/// listed company is taken from the same numbered position.
fn match_judgments<'a>(
    companies: &[RawCompanyRecord],
    judgments: &'a [CompanyJudgment],
) -> Vec<Option<&'a CompanyJudgment>> {
    let is_listed = |name: &str| companies.iter().any(|c| c.company_name == name);

    companies
        .iter()
        .enumerate()
        .map(|(i, company)| {
            if let Some(judgment) = judgments.iter().find(|j| j.company_name == company.company_name) {
                return Some(judgment);
            }
            let positional = judgments
                .get(i)
                .filter(|j| judgments.len() == companies.len() && !is_listed(&j.company_name));
            match positional {
                Some(judgment) => {
                    warn!(
                        company = company.company_name.as_str(),
                        returned = judgment.company_name.as_str(),
                        "Stability judgment matched by position"
                    );
                    Some(judgment)
                }
                None => {
                    if !judgments.is_empty() {
                        warn!(
                            company = company.company_name.as_str(),
                            "No stability judgment for company, using Unknown"
                        );
                    }
                    None
                }
            }
        })
        .collect()
}

/// Distinct known labels, sorted and joined with "/": "Product",
/// "Product/Service". "Unknown" when no company has a known label.
pub fn roll_up<'a>(labels: impl IntoIterator<Item = Option<&'a str>>) -> String {
    let distinct: BTreeSet<&str> = labels
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|label| !label.is_empty() && !label.eq_ignore_ascii_case(UNKNOWN))
        .collect();

    if distinct.is_empty() {
        UNKNOWN.to_string()
    } else {
        distinct.into_iter().collect::<Vec<_>>().join("/")
    }
}

/// Records merged by exact company name, first-seen order, positions concatenated.
fn unique_companies(records: &[RawCompanyRecord]) -> Vec<RawCompanyRecord> {
    let mut unique: Vec<RawCompanyRecord> = Vec::new();
    for record in records {
        match unique.iter_mut().find(|u| u.company_name == record.company_name) {
            Some(existing) => existing.positions.extend(record.positions.iter().cloned()),
            None => unique.push(record.clone()),
        }
    }
    unique
}
