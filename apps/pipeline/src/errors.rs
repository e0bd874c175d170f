use thiserror::Error;

use crate::extraction::{ExtractionError, SchemaKind};

/// Reasons a pipeline run fails outright.
///
/// Enrichment and stability problems never show up here: they degrade to
/// "Unknown" values inside the record instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("{schema} extraction failed: {source}")]
    Extraction {
        schema: SchemaKind,
        #[source]
        source: ExtractionError,
    },

    #[error("{schema} extraction refused: {reason}")]
    Refused { schema: SchemaKind, reason: String },

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn extraction(schema: SchemaKind, source: ExtractionError) -> Self {
        PipelineError::Extraction { schema, source }
    }

    /// The schema whose extraction failed, if any.
    pub fn schema(&self) -> Option<SchemaKind> {
        match self {
            PipelineError::Extraction { schema, .. } | PipelineError::Refused { schema, .. } => Some(*schema),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Required fields missing: {}", .fields.join(", "))]
    RequiredFieldMissing { fields: Vec<String> },
}
