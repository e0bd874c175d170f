use uuid::Uuid;

use crate::errors::AssemblyError;
use crate::models::candidate::{CandidateRecord, EducationItem, EnrichedCompanyRecord, IdentityInfo, StabilityRecord};

/// Builds the final record. Pure: the only failure is a blank required field,
/// and every blank field is reported at once.
pub fn assemble(
    run_id: Uuid,
    identity: IdentityInfo,
    education: Vec<EducationItem>,
    experience: Vec<EnrichedCompanyRecord>,
    stability: StabilityRecord,
) -> Result<CandidateRecord, AssemblyError> {
    let mut missing = Vec::new();
    if identity.full_name.trim().is_empty() {
        missing.push("identity.full_name".to_string());
    }
    for (i, company) in experience.iter().enumerate() {
        if company.company_name().trim().is_empty() {
            missing.push(format!("experience[{i}].company_name"));
        }
    }

    if !missing.is_empty() {
        return Err(AssemblyError::RequiredFieldMissing { fields: missing });
    }

    Ok(CandidateRecord::new(run_id, identity, education, experience, stability))
}
