//! Candidate extraction pipeline.
//!
//! Turns plain resume text into a normalized `CandidateRecord`:
//! Phase 1 (identity, education, raw experience) fans out to the structured
//! extraction service, Phase 2 runs stability analysis and adaptive company
//! enrichment side by side, and the assembler joins both into one record.
//! Every call to the external service goes through `extraction`.

pub mod config;
pub mod enrichment;
pub mod errors;
pub mod extraction;
pub mod models;
pub mod pipeline;
pub mod rubric;
pub mod scoring;
pub mod tenure;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::PipelineError;
pub use extraction::{Extraction, ExtractionError, StructuredExtractor};
pub use models::candidate::CandidateRecord;
pub use pipeline::Pipeline;
