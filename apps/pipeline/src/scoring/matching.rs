//! Candidate ↔ job description match assessment.
//!
//! The service scores the match; this module only corrects the fields it is
//! known to get wrong (a 0–100 rating instead of 0–10, 0/1 instead of a bool).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::extraction::{extract_typed, Extraction, Schema, StructuredExtractor};
use crate::models::candidate::CandidateRecord;
use crate::scoring::{normalize_boolean, normalize_score, BoolLike};

/// Match assessment exactly as the service returned it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatchAssessment {
    pub ai_rating: f64,
    #[serde(default)]
    pub should_be_shortlisted: String,
    #[serde(default)]
    pub missing_expectations: Vec<String>,
    #[serde(default)]
    pub overall_recommendation: String,
    #[serde(default)]
    pub ai_shortlisted: String,
    #[serde(default)]
    pub interview_in_process: String,
    pub final_result: BoolLike,
    #[serde(default)]
    pub candidate_joined: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchAssessment {
    /// 0–10.
    pub ai_rating: u8,
    pub should_be_shortlisted: String,
    pub missing_expectations: Vec<String>,
    pub overall_recommendation: String,
    pub ai_shortlisted: String,
    pub interview_in_process: String,
    pub final_result: bool,
    pub candidate_joined: String,
}

impl MatchAssessment {
    pub fn from_raw(raw: RawMatchAssessment) -> Self {
        Self {
            ai_rating: normalize_score(raw.ai_rating.round() as i64),
            should_be_shortlisted: raw.should_be_shortlisted,
            missing_expectations: raw.missing_expectations,
            overall_recommendation: raw.overall_recommendation,
            ai_shortlisted: raw.ai_shortlisted,
            interview_in_process: raw.interview_in_process,
            final_result: normalize_boolean(&raw.final_result),
            candidate_joined: raw.candidate_joined,
        }
    }
}

/// Scores `candidate` against `jd_text`. Refusals and service errors are
/// returned to the caller; there is no meaningful fallback score.
pub async fn assess_match(
    extractor: &dyn StructuredExtractor,
    schema: &Schema,
    candidate: &CandidateRecord,
    jd_text: &str,
    call_timeout: Duration,
) -> Result<MatchAssessment, PipelineError> {
    let candidate_json = serde_json::to_string_pretty(candidate)?;
    let payload = format!("Candidate record:\n{candidate_json}\n\nJob description:\n{jd_text}");

    let outcome = extract_typed::<RawMatchAssessment>(extractor, &payload, schema, call_timeout)
        .await
        .map_err(|e| PipelineError::extraction(schema.kind, e))?;

    match outcome {
        Extraction::Object(raw) => {
            let assessment = MatchAssessment::from_raw(raw);
            info!(
                run_id = %candidate.run_id(),
                ai_rating = assessment.ai_rating,
                final_result = assessment.final_result,
                "Match assessment complete"
            );
            Ok(assessment)
        }
        Extraction::Refusal(reason) => {
            warn!(run_id = %candidate.run_id(), "Match assessment refused: {reason}");
            Err(PipelineError::Refused {
                schema: schema.kind,
                reason,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::SchemaKind;
    use crate::models::candidate::{IdentityInfo, StabilityRecord};
    use crate::rubric::ScoringRubricVersion;
    use crate::testing::ScriptedExtractor;
    use serde_json::json;
    use uuid::Uuid;

    fn candidate() -> CandidateRecord {
        CandidateRecord::new(
            Uuid::new_v4(),
            IdentityInfo {
                full_name: "Asha Rao".to_string(),
                ..IdentityInfo::default()
            },
            Vec::new(),
            Vec::new(),
            StabilityRecord {
                per_company_tenure: Vec::new(),
                average_stability_years: 0.0,
                has_complex_experience: false,
                company_type_summary: "Unknown".to_string(),
                business_type_summary: "Unknown".to_string(),
                total_experience_years: 0.0,
                breakdown: Vec::new(),
            },
        )
    }

    fn raw_assessment(ai_rating: serde_json::Value, final_result: serde_json::Value) -> serde_json::Value {
        json!({
            "ai_rating": ai_rating,
            "should_be_shortlisted": "Yes",
            "missing_expectations": ["Kubernetes"],
            "overall_recommendation": "Strong backend profile.",
            "ai_shortlisted": "Yes",
            "interview_in_process": "No",
            "final_result": final_result,
            "candidate_joined": "Medium"
        })
    }

    #[test]
    fn test_from_raw_rescales_rating_and_coerces_result() {
        let raw: RawMatchAssessment = serde_json::from_value(raw_assessment(json!(84), json!(1))).unwrap();
        let assessment = MatchAssessment::from_raw(raw);
        assert_eq!(assessment.ai_rating, 8);
        assert!(assessment.final_result);
        assert_eq!(assessment.missing_expectations, vec!["Kubernetes".to_string()]);
    }

    #[test]
    fn test_from_raw_keeps_valid_fields() {
        let raw: RawMatchAssessment = serde_json::from_value(raw_assessment(json!(6), json!(false))).unwrap();
        let assessment = MatchAssessment::from_raw(raw);
        assert_eq!(assessment.ai_rating, 6);
        assert!(!assessment.final_result);
    }

    #[tokio::test]
    async fn test_assess_match_sends_candidate_and_jd() {
        let rubric = ScoringRubricVersion::standard();
        let extractor = ScriptedExtractor::new()
            .respond(SchemaKind::MatchAssessment, raw_assessment(json!(95), json!(0)));

        let assessment = assess_match(
            &extractor,
            &rubric.match_assessment,
            &candidate(),
            "Senior Rust engineer",
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(assessment.ai_rating, 9);
        assert!(!assessment.final_result);
        let payloads = extractor.payloads_for(SchemaKind::MatchAssessment);
        assert!(payloads[0].contains("Asha Rao"));
        assert!(payloads[0].contains("Senior Rust engineer"));
    }

    #[tokio::test]
    async fn test_assess_match_refusal_is_an_error() {
        let rubric = ScoringRubricVersion::standard();
        let extractor = ScriptedExtractor::new().refuse(SchemaKind::MatchAssessment);
        let err = assess_match(&extractor, &rubric.match_assessment, &candidate(), "JD", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Refused {
                schema: SchemaKind::MatchAssessment,
                ..
            }
        ));
    }
}
