//! Anthropic-backed `StructuredExtractor`.
//!
//! Model: claude-sonnet-4-5 (hardcoded, not configurable, so runs stay comparable)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::extraction::prompts::{EXTRACTION_PROMPT_TEMPLATE, JSON_ONLY_SYSTEM};
use crate::extraction::{Extraction, ExtractionError, Schema, StructuredExtractor};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every extraction call.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);
const REFUSAL_STOP_REASON: &str = "refusal";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    pub fn is_refusal(&self) -> bool {
        self.stop_reason.as_deref() == Some(REFUSAL_STOP_REASON)
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API with retry logic and JSON decoding.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, ExtractionError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            api_key,
        })
    }

    /// Makes a raw call to the API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, ExtractionError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<ExtractionError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Extraction call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ExtractionError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Extraction API returned {}: {}", status, body);
                last_error = Some(ExtractionError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(ExtractionError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "Extraction call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(ExtractionError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl StructuredExtractor for LlmClient {
    async fn extract(
        &self,
        payload: &str,
        schema: &Schema,
    ) -> Result<Extraction<serde_json::Value>, ExtractionError> {
        let system = format!("{JSON_ONLY_SYSTEM}\n\n{}", schema.instructions);
        let prompt = render_prompt(schema, payload);

        let response = self.call(&prompt, &system).await?;

        if response.is_refusal() {
            let reason = response
                .text()
                .unwrap_or("declined without explanation")
                .to_string();
            return Ok(Extraction::Refusal(reason));
        }

        let text = response.text().ok_or(ExtractionError::EmptyContent)?;
        let value = serde_json::from_str(strip_json_fences(text))?;
        Ok(Extraction::Object(value))
    }
}

fn render_prompt(schema: &Schema, payload: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{schema_name}", &schema.name())
        .replace("{contract}", schema.contract)
        .replace("{payload}", payload)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let stripped = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match stripped {
        Some(inner) => inner
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(inner.trim_start()),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::SchemaKind;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_render_prompt_substitutes_all_placeholders() {
        let schema = Schema::new(SchemaKind::Education, 1, "ignored here", r#"{"education": []}"#);
        let prompt = render_prompt(&schema, "BSc, MIT, 2015");
        assert!(prompt.contains("education.v1"));
        assert!(prompt.contains(r#"{"education": []}"#));
        assert!(prompt.contains("BSc, MIT, 2015"));
        assert!(!prompt.contains("{payload}"));
        assert!(!prompt.contains("{schema_name}"));
    }

    #[test]
    fn test_refusal_detected_from_stop_reason() {
        let response: LlmResponse = serde_json::from_str(
            r#"{
                "content": [{"type": "text", "text": "I can't help with that."}],
                "stop_reason": "refusal",
                "usage": {"input_tokens": 10, "output_tokens": 5}
            }"#,
        )
        .unwrap();
        assert!(response.is_refusal());
        assert_eq!(response.text(), Some("I can't help with that."));
    }

    #[test]
    fn test_end_turn_is_not_refusal() {
        let response: LlmResponse = serde_json::from_str(
            r#"{
                "content": [{"type": "text", "text": "{}"}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 10, "output_tokens": 5}
            }"#,
        )
        .unwrap();
        assert!(!response.is_refusal());
    }
}
