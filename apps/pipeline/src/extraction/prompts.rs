// Instruction and contract text for each extraction kind.
// Rubric versions pick from these; nothing else should build prompt text.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured extraction assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// User message wrapper. `{schema_name}`, `{contract}` and `{payload}` are substituted.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Schema: {schema_name}

Return a JSON object that matches this exact shape:
{contract}

Input:
{payload}"#;

pub const IDENTITY_INSTRUCTIONS: &str = "\
    Extract the candidate's personal details from the resume text: full name, email address, \
    phone number, a list of skills, and the single role that best fits the candidate's \
    experience. Use an empty string for any contact detail that is not present.";

pub const IDENTITY_CONTRACT: &str = r#"{
  "identity": {
    "full_name": "string",
    "email": "string",
    "phone": "string",
    "skills": ["string"],
    "suggested_role": "string"
  }
}"#;

pub const EDUCATION_INSTRUCTIONS: &str = "\
    Extract every education entry from the resume text: institution, course or degree, and \
    graduation year. Keep the order in which they appear.";

pub const EDUCATION_CONTRACT: &str = r#"{
  "education": [
    { "institution": "string", "degree": "string", "graduation_year": "string" }
  ]
}"#;

pub const RAW_EXPERIENCE_INSTRUCTIONS: &str = "\
    Extract the work history from the resume text. Group positions by company; one entry per \
    company block as written in the resume, in the order they appear. Copy start and end dates \
    exactly as written (e.g. 'Feb 2022', '07/2019', 'Present'). Do NOT compute durations.";

pub const RAW_EXPERIENCE_CONTRACT: &str = r#"{
  "experience": [
    {
      "company_name": "string",
      "positions": [ { "title": "string", "start": "string", "end": "string" } ]
    }
  ]
}"#;

pub const COMPANY_ENRICHMENT_INSTRUCTIONS: &str = "\
    For each numbered company, classify company_type as Product, Service or Banking and \
    business_type as B2B, B2C or Banking. Give the headquarters location as 'City, Country', \
    employee_count as a headcount or range, and funding as the latest stage and amount. \
    Use null for employee_count or funding when unknown. Return exactly one entry per company, \
    in the listed order.";

pub const COMPANY_ENRICHMENT_SEARCH_INSTRUCTIONS: &str = "\
    For each numbered company, consult current public information (company site, funding \
    databases, news) before answering. Classify company_type as Product, Service or Banking and \
    business_type as B2B, B2C or Banking. Give the headquarters location as 'City, Country', \
    employee_count as a headcount or range, and funding as the latest stage and amount. \
    Use null for employee_count or funding when unknown. Return exactly one entry per company, \
    in the listed order.";

pub const COMPANY_ENRICHMENT_CONTRACT: &str = r#"{
  "enriched_companies": [
    {
      "company_name": "string",
      "company_type": "Product | Service | Banking",
      "business_type": "B2B | B2C | Banking",
      "employee_count": "string or null",
      "funding": "string or null",
      "location": "string"
    }
  ]
}"#;

pub const STABILITY_INSTRUCTIONS: &str = "\
    For each company in the work history, classify company_type (Product, Service or Banking) \
    and business_type (B2B, B2C or Banking), and set is_complex to true when the company offers \
    complex work: strong ownership, large scale, deep technology, a product-led engineering \
    culture, or notable industry recognition. Do NOT compute tenure.";

pub const STABILITY_CONTRACT: &str = r#"{
  "companies": [
    {
      "company_name": "string",
      "company_type": "string",
      "business_type": "string",
      "is_complex": true
    }
  ]
}"#;

pub const MATCH_ASSESSMENT_INSTRUCTIONS: &str = "\
    Compare the candidate record against the job description. Score the candidate out of 100 \
    points, then convert to a 0-10 ai_rating using the bucket table (90-100 → 9, 80-89 → 8, \
    ... 0-9 → 0). List missing expectations, give a 3-4 line recommendation with an experience \
    breakdown, answer Yes/No for shortlisting, set final_result to true for selected, and rate \
    the likelihood of joining as High, Medium or Low.";

pub const MATCH_ASSESSMENT_CONTRACT: &str = r#"{
  "ai_rating": 0,
  "should_be_shortlisted": "Yes | No",
  "missing_expectations": ["string"],
  "overall_recommendation": "string",
  "ai_shortlisted": "Yes | No",
  "interview_in_process": "Yes | No",
  "final_result": true,
  "candidate_joined": "High | Medium | Low"
}"#;
