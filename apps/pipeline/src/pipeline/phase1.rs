//! Phase 1: identity, education and raw experience, extracted concurrently.
//!
//! Fail-fast: the first branch to fail or be refused aborts the join, since
//! there is no sensible stand-in for a candidate without a name or history.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::extraction::{extract_typed, Extraction, Schema, StructuredExtractor};
use crate::models::candidate::{EducationItem, IdentityInfo, RawCompanyRecord};
use crate::rubric::ScoringRubricVersion;

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    identity: IdentityInfo,
}

#[derive(Debug, Deserialize)]
struct EducationResponse {
    #[serde(default)]
    education: Vec<EducationItem>,
}

#[derive(Debug, Deserialize)]
struct ExperienceResponse {
    #[serde(default)]
    experience: Vec<RawCompanyRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phase1Output {
    pub identity: IdentityInfo,
    pub education: Vec<EducationItem>,
    pub experience: Vec<RawCompanyRecord>,
}

pub async fn run_phase1(
    extractor: &dyn StructuredExtractor,
    rubric: &ScoringRubricVersion,
    text: &str,
    call_timeout: Duration,
) -> Result<Phase1Output, PipelineError> {
    let started = Instant::now();

    let (identity, education, experience) = tokio::try_join!(
        extract_required::<IdentityResponse>(extractor, text, &rubric.identity, call_timeout),
        extract_required::<EducationResponse>(extractor, text, &rubric.education, call_timeout),
        extract_required::<ExperienceResponse>(extractor, text, &rubric.raw_experience, call_timeout),
    )?;

    info!(
        education = education.education.len(),
        companies = experience.experience.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Phase 1 complete"
    );

    Ok(Phase1Output {
        identity: identity.identity,
        education: education.education,
        experience: experience.experience,
    })
}

async fn extract_required<T: DeserializeOwned>(
    extractor: &dyn StructuredExtractor,
    text: &str,
    schema: &Schema,
    call_timeout: Duration,
) -> Result<T, PipelineError> {
    let outcome = extract_typed::<T>(extractor, text, schema, call_timeout)
        .await
        .map_err(|e| {
            warn!(schema = %schema.kind, "Phase 1 extraction failed: {e}");
            PipelineError::extraction(schema.kind, e)
        })?;

    match outcome {
        Extraction::Object(value) => Ok(value),
        Extraction::Refusal(reason) => {
            warn!(schema = %schema.kind, "Phase 1 extraction refused: {reason}");
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
    use crate::extraction::{ExtractionError, SchemaKind};
    use crate::testing::ScriptedExtractor;
    use serde_json::json;

    const RESUME: &str = "Asha Rao, backend engineer. IIT Madras 2018.";

    async fn run(extractor: &ScriptedExtractor, timeout: Duration) -> Result<Phase1Output, PipelineError> {
        run_phase1(extractor, &ScoringRubricVersion::standard(), RESUME, timeout).await
    }

    #[tokio::test]
    async fn test_phase1_joins_all_three_branches() {
        let extractor = ScriptedExtractor::candidate(2);
        let output = run(&extractor, Duration::from_secs(5)).await.unwrap();

        assert_eq!(output.identity.full_name, "Asha Rao");
        assert_eq!(output.identity.skills, vec!["Rust".to_string(), "Kafka".to_string()]);
        assert_eq!(output.education[0].institution, "IIT Madras");
        assert_eq!(output.experience.len(), 2);
        assert_eq!(output.experience[1].company_name, "Company 1");
        assert_eq!(extractor.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_phase1_sends_raw_text_to_each_branch() {
        let extractor = ScriptedExtractor::candidate(1);
        run(&extractor, Duration::from_secs(5)).await.unwrap();
        for kind in [SchemaKind::Identity, SchemaKind::Education, SchemaKind::RawExperience] {
            assert_eq!(extractor.payloads_for(kind), vec![RESUME.to_string()]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase1_branches_run_concurrently() {
        let extractor = ScriptedExtractor::candidate(1).with_delay(Duration::from_secs(10));
        let started = tokio::time::Instant::now();
        run(&extractor, Duration::from_secs(30)).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[tokio::test]
    async fn test_phase1_branch_failure_fails_the_phase() {
        let extractor = ScriptedExtractor::candidate(2).fail(SchemaKind::Education);
        let err = run(&extractor, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction {
                schema: SchemaKind::Education,
                source: ExtractionError::Api { status: 503, .. }
            }
        ));
    }

    #[tokio::test]
    async fn test_phase1_refusal_fails_the_phase() {
        let extractor = ScriptedExtractor::candidate(2).refuse(SchemaKind::Identity);
        let err = run(&extractor, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Refused {
                schema: SchemaKind::Identity,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_phase1_malformed_object_fails_the_phase() {
        let extractor =
            ScriptedExtractor::candidate(2).respond(SchemaKind::Identity, json!({ "name": "Asha Rao" }));
        let err = run(&extractor, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction {
                schema: SchemaKind::Identity,
                source: ExtractionError::Parse(_)
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase1_timeout_fails_the_phase() {
        let extractor = ScriptedExtractor::candidate(1).with_delay(Duration::from_secs(60));
        let err = run(&extractor, Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Extraction {
                source: ExtractionError::Timeout { .. },
                ..
            }
        ));
    }
}
