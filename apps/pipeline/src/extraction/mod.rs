/// Structured Extraction — the single seam between the pipeline and the
/// external extraction service.
///
/// ARCHITECTURAL RULE: components never talk to the service directly. They hold
/// an injected `Arc<dyn StructuredExtractor>` and call it through `extract_typed`,
/// which bounds every call with a timeout and deserializes the result.
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod client;
pub mod prompts;
pub mod schema;

pub use client::LlmClient;
pub use schema::{Schema, SchemaKind};

/// Outcome of a call the service answered: either an object or an explicit refusal.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction<T> {
    Object(T),
    Refusal(String),
}

/// Transport or decoding failure of an extraction call.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Extraction service returned empty content")]
    EmptyContent,

    #[error("Extraction call timed out after {}s", .after.as_secs())]
    Timeout { after: Duration },
}

/// The extraction capability. Implement this to swap the backing service
/// without touching any coordinator.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract(
        &self,
        payload: &str,
        schema: &Schema,
    ) -> Result<Extraction<serde_json::Value>, ExtractionError>;
}

/// Calls the extractor with a deadline and decodes the object into `T`.
pub async fn extract_typed<T: DeserializeOwned>(
    extractor: &dyn StructuredExtractor,
    payload: &str,
    schema: &Schema,
    timeout: Duration,
) -> Result<Extraction<T>, ExtractionError> {
    let outcome = tokio::time::timeout(timeout, extractor.extract(payload, schema))
        .await
        .map_err(|_| ExtractionError::Timeout { after: timeout })??;

    match outcome {
        Extraction::Object(value) => Ok(Extraction::Object(serde_json::from_value(value)?)),
        Extraction::Refusal(reason) => Ok(Extraction::Refusal(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::ScoringRubricVersion;
    use crate::testing::ScriptedExtractor;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Greeting {
        hello: String,
    }

    #[tokio::test]
    async fn test_extract_typed_decodes_object() {
        let rubric = ScoringRubricVersion::standard();
        let extractor = ScriptedExtractor::new().respond(SchemaKind::Identity, json!({"hello": "world"}));
        let out: Extraction<Greeting> =
            extract_typed(&extractor, "text", &rubric.identity, Duration::from_secs(5))
                .await
                .unwrap();
        assert_eq!(
            out,
            Extraction::Object(Greeting {
                hello: "world".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_extract_typed_malformed_object_is_parse_error() {
        let rubric = ScoringRubricVersion::standard();
        let extractor = ScriptedExtractor::new().respond(SchemaKind::Identity, json!({"bye": 1}));
        let err = extract_typed::<Greeting>(&extractor, "text", &rubric.identity, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[tokio::test]
    async fn test_extract_typed_passes_refusal_through() {
        let rubric = ScoringRubricVersion::standard();
        let extractor = ScriptedExtractor::new().refuse(SchemaKind::Identity);
        let out = extract_typed::<Greeting>(&extractor, "text", &rubric.identity, Duration::from_secs(5))
            .await
            .unwrap();
        assert!(matches!(out, Extraction::Refusal(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_extract_typed_times_out() {
        let rubric = ScoringRubricVersion::standard();
        let extractor = ScriptedExtractor::new()
            .respond(SchemaKind::Identity, json!({"hello": "late"}))
            .with_delay(Duration::from_secs(30));
        let err = extract_typed::<Greeting>(&extractor, "text", &rubric.identity, Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Timeout { .. }));
    }
}
