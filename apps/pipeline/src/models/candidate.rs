use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::enrichment::company_facts::{Funding, Headcount};

/// Placeholder written into enrichment fields the service could not supply.
pub const UNKNOWN: &str = "Unknown";

/// A date exactly as it appeared in the document: "Feb 2022", "07/2019", "Present".
///
/// A `null` from the service becomes an empty token, which the date normalizer
/// rejects like any other unusable date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DateToken(String);

impl<'de> Deserialize<'de> for DateToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_empty(deserializer).map(Self)
    }
}

impl DateToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DateToken {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// One position held at a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionStint {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default)]
    pub start: DateToken,
    #[serde(default)]
    pub end: DateToken,
}

/// `null` reads as "".
fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A company and the positions held there, as extracted in Phase 1.
/// Read-only once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCompanyRecord {
    pub company_name: String,
    #[serde(default)]
    pub positions: Vec<PositionStint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityInfo {
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub suggested_role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationItem {
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub graduation_year: String,
}

/// Structured facts parsed out of the free-text headcount and funding strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyFacts {
    pub headcount: Option<Headcount>,
    pub funding: Option<Funding>,
}

/// Fields added to a company by enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetails {
    pub company_type: String,
    pub business_type: String,
    pub employee_count: Option<String>,
    pub funding: Option<String>,
    pub location: String,
    pub facts: CompanyFacts,
}

impl CompanyDetails {
    /// Sentinel details used when the service gave nothing usable for a company.
    pub fn unknown() -> Self {
        Self {
            company_type: UNKNOWN.to_string(),
            business_type: UNKNOWN.to_string(),
            employee_count: None,
            funding: None,
            location: UNKNOWN.to_string(),
            facts: CompanyFacts::default(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.company_type == UNKNOWN && self.business_type == UNKNOWN && self.location == UNKNOWN
    }
}

/// A raw company record plus enrichment.
///
/// `company_name` and `positions` are copied from the raw record and cannot be
/// set any other way, so whatever the service returns for them is discarded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedCompanyRecord {
    company_name: String,
    positions: Vec<PositionStint>,
    #[serde(flatten)]
    details: CompanyDetails,
}

impl EnrichedCompanyRecord {
    pub fn from_raw(raw: &RawCompanyRecord, details: CompanyDetails) -> Self {
        Self {
            company_name: raw.company_name.clone(),
            positions: raw.positions.clone(),
            details,
        }
    }

    pub fn sentinel(raw: &RawCompanyRecord) -> Self {
        Self::from_raw(raw, CompanyDetails::unknown())
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn positions(&self) -> &[PositionStint] {
        &self.positions
    }

    pub fn details(&self) -> &CompanyDetails {
        &self.details
    }
}

/// Months and years attributed to a single stint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StintBreakdown {
    pub company_name: String,
    pub title: String,
    pub start: DateToken,
    pub end: DateToken,
    pub months: i64,
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityRecord {
    /// `"{company}: {years} years"`, one per unique company in first-seen order.
    pub per_company_tenure: Vec<String>,
    pub average_stability_years: f64,
    pub has_complex_experience: bool,
    pub company_type_summary: String,
    pub business_type_summary: String,
    pub total_experience_years: f64,
    pub breakdown: Vec<StintBreakdown>,
}

/// Terminal artifact of one pipeline run. Built only by the record assembler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRecord {
    run_id: Uuid,
    identity: IdentityInfo,
    education: Vec<EducationItem>,
    experience: Vec<EnrichedCompanyRecord>,
    stability: StabilityRecord,
}

impl CandidateRecord {
    pub(crate) fn new(
        run_id: Uuid,
        identity: IdentityInfo,
        education: Vec<EducationItem>,
        experience: Vec<EnrichedCompanyRecord>,
        stability: StabilityRecord,
    ) -> Self {
        Self {
            run_id,
            identity,
            education,
            experience,
            stability,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn identity(&self) -> &IdentityInfo {
        &self.identity
    }

    pub fn education(&self) -> &[EducationItem] {
        &self.education
    }

    pub fn experience(&self) -> &[EnrichedCompanyRecord] {
        &self.experience
    }

    pub fn stability(&self) -> &StabilityRecord {
        &self.stability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> RawCompanyRecord {
        RawCompanyRecord {
            company_name: name.to_string(),
            positions: vec![PositionStint {
                title: "Engineer".to_string(),
                start: "Jan 2020".into(),
                end: "Present".into(),
            }],
        }
    }

    #[test]
    fn test_sentinel_keeps_identity_fields() {
        let source = raw("Acme");
        let enriched = EnrichedCompanyRecord::sentinel(&source);
        assert_eq!(enriched.company_name(), "Acme");
        assert_eq!(enriched.positions(), source.positions.as_slice());
        assert!(enriched.details().is_unknown());
        assert_eq!(enriched.details().employee_count, None);
    }

    #[test]
    fn test_enriched_record_serializes_flat() {
        let enriched = EnrichedCompanyRecord::sentinel(&raw("Acme"));
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["company_name"], "Acme");
        assert_eq!(value["company_type"], "Unknown");
        assert!(value["funding"].is_null());
    }

    #[test]
    fn test_raw_record_positions_default_to_empty() {
        let parsed: RawCompanyRecord = serde_json::from_str(r#"{"company_name": "Acme"}"#).unwrap();
        assert!(parsed.positions.is_empty());
    }

    #[test]
    fn test_date_token_is_transparent() {
        let stint: PositionStint = serde_json::from_str(
            r#"{"title": "SDE", "start": "Feb 2022", "end": "Present"}"#,
        )
        .unwrap();
        assert_eq!(stint.start.as_str(), "Feb 2022");
        assert_eq!(stint.end, DateToken::from("Present"));
    }

    #[test]
    fn test_null_or_missing_dates_become_empty_tokens() {
        let stint: PositionStint =
            serde_json::from_str(r#"{"title": null, "start": "Feb 2022", "end": null}"#).unwrap();
        assert_eq!(stint.title, "");
        assert_eq!(stint.start.as_str(), "Feb 2022");
        assert_eq!(stint.end.as_str(), "");

        let stint: PositionStint = serde_json::from_str(r#"{"title": "SDE", "start": "Feb 2022"}"#).unwrap();
        assert_eq!(stint.end, DateToken::default());
    }
}
