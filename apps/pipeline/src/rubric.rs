//! Scoring rubric versions — one configuration object per prompt/schema
//! generation, so variants parameterize a single pipeline.

use crate::extraction::prompts::*;
use crate::extraction::{Schema, SchemaKind};

pub const STANDARD: &str = "standard";
pub const WEB_SEARCH: &str = "web-search";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRubricVersion {
    pub label: &'static str,
    pub identity: Schema,
    pub education: Schema,
    pub raw_experience: Schema,
    pub company_enrichment: Schema,
    pub stability: Schema,
    pub match_assessment: Schema,
}

impl ScoringRubricVersion {
    pub fn standard() -> Self {
        Self {
            label: STANDARD,
            identity: Schema::new(SchemaKind::Identity, 1, IDENTITY_INSTRUCTIONS, IDENTITY_CONTRACT),
            education: Schema::new(SchemaKind::Education, 1, EDUCATION_INSTRUCTIONS, EDUCATION_CONTRACT),
            raw_experience: Schema::new(
                SchemaKind::RawExperience,
                1,
                RAW_EXPERIENCE_INSTRUCTIONS,
                RAW_EXPERIENCE_CONTRACT,
            ),
            company_enrichment: Schema::new(
                SchemaKind::CompanyEnrichment,
                1,
                COMPANY_ENRICHMENT_INSTRUCTIONS,
                COMPANY_ENRICHMENT_CONTRACT,
            ),
            stability: Schema::new(SchemaKind::Stability, 1, STABILITY_INSTRUCTIONS, STABILITY_CONTRACT),
            match_assessment: Schema::new(
                SchemaKind::MatchAssessment,
                1,
                MATCH_ASSESSMENT_INSTRUCTIONS,
                MATCH_ASSESSMENT_CONTRACT,
            ),
        }
    }

    /// Same contracts as `standard`; enrichment asks the service to consult
    /// current public information.
    pub fn web_search() -> Self {
        Self {
            label: WEB_SEARCH,
            company_enrichment: Schema::new(
                SchemaKind::CompanyEnrichment,
                2,
                COMPANY_ENRICHMENT_SEARCH_INSTRUCTIONS,
                COMPANY_ENRICHMENT_CONTRACT,
            ),
            ..Self::standard()
        }
    }

    pub fn by_label(label: &str) -> Option<Self> {
        match label {
            STANDARD => Some(Self::standard()),
            WEB_SEARCH => Some(Self::web_search()),
            _ => None,
        }
    }
}

impl Default for ScoringRubricVersion {
    fn default() -> Self {
        Self::standard()
    }
}
