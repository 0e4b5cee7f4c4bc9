// Prompt templates for the screening service's text-generation calls.
// Placeholders are substituted with `str::replace`.

pub const RESUME_PARSE_SYSTEM: &str = "You are a résumé parser for a technical recruiting team. \
    You MUST respond with valid JSON only.";

pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Extract the candidate's résumé into this JSON shape:

{
  "name": string,
  "email": string,
  "summary": string,
  "skills": [string],
  "experience": [
    {"role": string, "company": string, "start_date": string, "end_date": string, "description": string}
  ],
  "education": [
    {"degree": string, "field": string, "institution": string}
  ],
  "certifications": [
    {"name": string, "issuer": string}
  ]
}

Dates: use "YYYY-MM" when month and year are known, "YYYY" when only the year is known,
and "Present" for ongoing roles.

{no_invention}

RÉSUMÉ:
{resume_text}"#;

pub const JOB_PARSE_SYSTEM: &str = "You are a job-posting analyst. \
    You MUST respond with valid JSON only.";

pub const JOB_PARSE_PROMPT_TEMPLATE: &str = r#"Extract the job posting into this JSON shape:

{
  "title": string,
  "keywords": [string]
}

"keywords" lists the concrete required skills, tools, languages, frameworks and platforms,
one per entry, most important first. Leave out soft phrasing such as "team player".

{no_invention}

JOB POSTING:
{job_text}"#;

pub const SCORE_SYSTEM: &str = "You are a technical recruiter scoring candidate fit. \
    You MUST respond with valid JSON only.";

pub const SCORE_PROMPT_TEMPLATE: &str = r#"Score how well this candidate fits the job on a 0-100 scale.

Weigh required-skill coverage most heavily, then relevant experience, then education,
certifications and job stability.

Respond with: {"score": number, "rationale": string}

CANDIDATE:
{candidate_json}

JOB:
{job_json}"#;

pub const SKILLS_ONLY_SCORE_PROMPT_TEMPLATE: &str = r#"Score how well this candidate's skills cover the job's required keywords on a 0-100 scale.

Respond with: {"score": number, "rationale": string}

CANDIDATE SKILLS:
{skills_json}

JOB KEYWORDS:
{keywords_json}"#;
