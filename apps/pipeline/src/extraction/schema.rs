use std::fmt;

use serde::Serialize;

/// The kinds of structured object the service is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Identity,
    Education,
    RawExperience,
    CompanyEnrichment,
    Stability,
    MatchAssessment,
}

impl SchemaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::Identity => "identity",
            SchemaKind::Education => "education",
            SchemaKind::RawExperience => "raw_experience",
            SchemaKind::CompanyEnrichment => "company_enrichment",
            SchemaKind::Stability => "stability",
            SchemaKind::MatchAssessment => "match_assessment",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, versioned field contract for one extraction kind.
///
/// `instructions` tells the service what to extract; `contract` is the JSON
/// shape the response must follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub kind: SchemaKind,
    pub version: u32,
    pub instructions: &'static str,
    pub contract: &'static str,
}

impl Schema {
    pub fn new(
        kind: SchemaKind,
        version: u32,
        instructions: &'static str,
        contract: &'static str,
    ) -> Self {
        Self {
            kind,
            version,
            instructions,
            contract,
        }
    }

    /// e.g. `company_enrichment.v2`
    pub fn name(&self) -> String {
        format!("{}.v{}", self.kind, self.version)
    }
}
