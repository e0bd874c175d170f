//! Pipeline entry point: Phase 1 → Phase 2 → assembly.
//!
//! Phase 1 is fail-fast, Phase 2 is fail-contained. A run therefore either
//! returns a complete `CandidateRecord` (possibly holding "Unknown"
//! enrichment values) or fails because identity, education or experience
//! extraction failed, or a required field came back blank.

pub mod assembler;
pub mod phase1;
pub mod phase2;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::enrichment::CompanyEnricher;
use crate::errors::PipelineError;
use crate::extraction::StructuredExtractor;
use crate::models::candidate::CandidateRecord;
use crate::rubric::ScoringRubricVersion;
use crate::scoring::matching::{assess_match, MatchAssessment};
use crate::tenure::dates::DateNormalizer;
use crate::tenure::stability::StabilityAnalyzer;

pub use assembler::assemble;
pub use phase1::{run_phase1, Phase1Output};
pub use phase2::run_phase2;

#[derive(Clone)]
pub struct Pipeline {
    extractor: Arc<dyn StructuredExtractor>,
    rubric: ScoringRubricVersion,
    call_timeout: Duration,
    /// Fixed "today" for resolving "Present"; `None` uses the clock at run start.
    reference_date: Option<NaiveDate>,
}

impl Pipeline {
    pub fn new(extractor: Arc<dyn StructuredExtractor>, rubric: ScoringRubricVersion, call_timeout: Duration) -> Self {
        Self {
            extractor,
            rubric,
            call_timeout,
            reference_date: None,
        }
    }

    pub fn from_config(config: &Config, extractor: Arc<dyn StructuredExtractor>) -> Self {
        Self::new(extractor, config.rubric.clone(), config.extraction_timeout)
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn rubric(&self) -> &ScoringRubricVersion {
        &self.rubric
    }

    pub async fn run(&self, raw_text: &str) -> Result<CandidateRecord, PipelineError> {
        if raw_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("pipeline", %run_id, rubric = self.rubric.label);
        self.run_inner(run_id, raw_text).instrument(span).await
    }

    /// Scores an assembled record against a job description.
    pub async fn assess_match(
        &self,
        candidate: &CandidateRecord,
        jd_text: &str,
    ) -> Result<MatchAssessment, PipelineError> {
        assess_match(
            self.extractor.as_ref(),
            &self.rubric.match_assessment,
            candidate,
            jd_text,
            self.call_timeout,
        )
        .await
    }

    async fn run_inner(&self, run_id: Uuid, raw_text: &str) -> Result<CandidateRecord, PipelineError> {
        let started = Instant::now();
        // Resolved once so every stint in a run shares the same "now".
        let dates = match self.reference_date {
            Some(date) => DateNormalizer::with_reference_date(date),
            None => DateNormalizer::current(),
        };

        let phase1 = run_phase1(self.extractor.as_ref(), &self.rubric, raw_text, self.call_timeout).await?;

        let analyzer = StabilityAnalyzer::new(self.extractor.clone(), self.rubric.stability.clone(), self.call_timeout);
        let enricher = CompanyEnricher::new(
            self.extractor.clone(),
            self.rubric.company_enrichment.clone(),
            self.call_timeout,
        );
        let (stability, experience) = run_phase2(&analyzer, &enricher, &phase1.experience, &dates).await;

        let record = assemble(run_id, phase1.identity, phase1.education, experience, stability)?;

        info!(
            companies = record.experience().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );
        Ok(record)
    }
}
