//! Scripted in-memory `StructuredExtractor` for coordinator tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::extraction::{Extraction, ExtractionError, Schema, SchemaKind, StructuredExtractor};

type Responder = Box<dyn Fn(&str) -> Value + Send + Sync>;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub kind: SchemaKind,
    pub payload: String,
}

#[derive(Default)]
pub(crate) struct ScriptedExtractor {
    responders: HashMap<SchemaKind, Responder>,
    refusals: HashSet<SchemaKind>,
    failures: HashSet<SchemaKind>,
    fail_marker: Option<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, kind: SchemaKind, value: Value) -> Self {
        self.respond_with(kind, move |_| value.clone())
    }

    pub fn respond_with(
        mut self,
        kind: SchemaKind,
        responder: impl Fn(&str) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.responders.insert(kind, Box::new(responder));
        self
    }

    pub fn refuse(mut self, kind: SchemaKind) -> Self {
        self.refusals.insert(kind);
        self
    }

    pub fn fail(mut self, kind: SchemaKind) -> Self {
        self.failures.insert(kind);
        self
    }

    /// Any call whose payload contains `marker` fails with a 503.
    pub fn fail_when_payload_contains(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// A fully scripted candidate: identity, education, `companies` raw
    /// companies, echoing enrichment and stability responders.
    pub fn candidate(companies: usize) -> Self {
        Self::new()
            .respond(SchemaKind::Identity, identity_response())
            .respond(SchemaKind::Education, education_response())
            .respond(SchemaKind::RawExperience, experience_response(companies))
            .respond_with(SchemaKind::CompanyEnrichment, echo_enrichment)
            .respond_with(SchemaKind::Stability, echo_stability)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn payloads_for(&self, kind: SchemaKind) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.kind == kind)
            .map(|call| call.payload)
            .collect()
    }
}

#[async_trait]
impl StructuredExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        payload: &str,
        schema: &Schema,
    ) -> Result<Extraction<Value>, ExtractionError> {
        self.calls.lock().unwrap().push(RecordedCall {
            kind: schema.kind,
            payload: payload.to_string(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let marked = self
            .fail_marker
            .as_deref()
            .is_some_and(|marker| payload.contains(marker));
        if marked || self.failures.contains(&schema.kind) {
            return Err(ExtractionError::Api {
                status: 503,
                message: "scripted failure".to_string(),
            });
        }
        if self.refusals.contains(&schema.kind) {
            return Ok(Extraction::Refusal("scripted refusal".to_string()));
        }
        match self.responders.get(&schema.kind) {
            Some(responder) => Ok(Extraction::Object(responder(payload))),
            None => Err(ExtractionError::EmptyContent),
        }
    }
}

/// Company names listed in a numbered payload ("1. Acme").
pub(crate) fn listed_companies(payload: &str) -> Vec<String> {
    payload
        .lines()
        .filter_map(|line| {
            let (number, rest) = line.split_once(". ")?;
            number
                .trim()
                .chars()
                .all(|c| c.is_ascii_digit())
                .then(|| rest.trim().to_string())
        })
        .collect()
}

/// One enrichment entry per listed company. Names come back altered so tests
/// can check they are overwritten.
pub(crate) fn echo_enrichment(payload: &str) -> Value {
    let companies: Vec<Value> = listed_companies(payload)
        .into_iter()
        .map(|name| {
            json!({
                "company_name": format!("{name} (renamed)"),
                "company_type": "Product",
                "business_type": "B2B",
                "employee_count": "1,001-5,000 employees",
                "funding": "Series B ($120M)",
                "location": "Bengaluru, India"
            })
        })
        .collect();
    json!({ "enriched_companies": companies })
}

pub(crate) fn echo_stability(payload: &str) -> Value {
    let companies: Vec<Value> = listed_companies(payload)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "company_name": name,
                "company_type": if i % 2 == 0 { "Product" } else { "Service" },
                "business_type": "B2B",
                "is_complex": if i == 0 { json!(1) } else { json!(false) }
            })
        })
        .collect();
    json!({ "companies": companies })
}

pub(crate) fn identity_response() -> Value {
    json!({
        "identity": {
            "full_name": "Asha Rao",
            "email": "asha@example.com",
            "phone": "+91 98450 00000",
            "skills": ["Rust", "Kafka"],
            "suggested_role": "Backend Engineer"
        }
    })
}

pub(crate) fn education_response() -> Value {
    json!({
        "education": [
            { "institution": "IIT Madras", "degree": "B.Tech CSE", "graduation_year": "2018" }
        ]
    })
}

pub(crate) fn experience_response(companies: usize) -> Value {
    let experience: Vec<Value> = (0..companies)
        .map(|i| {
            json!({
                "company_name": format!("Company {i}"),
                "positions": [
                    { "title": "Engineer", "start": format!("Jan {}", 2010 + i), "end": format!("Dec {}", 2010 + i) }
                ]
            })
        })
        .collect();
    json!({ "experience": experience })
}
