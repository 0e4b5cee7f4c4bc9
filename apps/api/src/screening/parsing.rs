//! Résumé and job-posting parsing through the text-generation service.
//!
//! Model output is untrusted. The résumé goes through the same boundary
//! normalization as a candidate submitted directly, and job keywords through the
//! same skill-list normalization.

use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::NO_INVENTION_INSTRUCTION;
use crate::llm_client::{Completion, LlmError};
use crate::models::candidate::{CandidateProfile, REQUIRED_FIELDS};
use crate::models::job::JobPosting;
use crate::screening::prompts::{
    JOB_PARSE_PROMPT_TEMPLATE, JOB_PARSE_SYSTEM, RESUME_PARSE_PROMPT_TEMPLATE,
    RESUME_PARSE_SYSTEM,
};

/// Texts longer than this are cut before the first attempt.
pub const MAX_TEXT_CHARS: usize = 48_000;
/// Size of the single retry after a payload-too-large rejection.
pub const REDUCED_TEXT_CHARS: usize = 12_000;

pub async fn parse_resume(
    completion: &dyn Completion,
    resume_text: &str,
) -> Result<CandidateProfile, AppError> {
    let build = |text: &str| {
        RESUME_PARSE_PROMPT_TEMPLATE
            .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
            .replace("{resume_text}", text)
    };
    let mut value = call_with_reduction(completion, resume_text, RESUME_PARSE_SYSTEM, build)
        .await
        .map_err(|e| AppError::Llm(format!("Résumé parsing failed: {e}")))?;

    fill_required_placeholders(&mut value);
    let profile = CandidateProfile::from_value(&value)?;
    info!(
        "Parsed résumé: {} skills, {} experience entries",
        profile.skills.len(),
        profile.experience.len()
    );
    Ok(profile)
}

pub async fn parse_job(
    completion: &dyn Completion,
    job_text: &str,
) -> Result<JobPosting, AppError> {
    let build = |text: &str| {
        JOB_PARSE_PROMPT_TEMPLATE
            .replace("{no_invention}", NO_INVENTION_INSTRUCTION)
            .replace("{job_text}", text)
    };
    let value = call_with_reduction(completion, job_text, JOB_PARSE_SYSTEM, build)
        .await
        .map_err(|e| AppError::Llm(format!("Job posting parsing failed: {e}")))?;

    let job: JobPosting = serde_json::from_value(value)
        .map_err(|e| AppError::Llm(format!("Job posting parsing failed: {e}")))?;
    info!("Parsed job posting: {} keywords", job.keywords.len());
    Ok(job)
}

/// One attempt with the text capped at `MAX_TEXT_CHARS`; on payload-too-large,
/// exactly one more with it cut to `REDUCED_TEXT_CHARS`.
async fn call_with_reduction<F>(
    completion: &dyn Completion,
    text: &str,
    system: &str,
    build_prompt: F,
) -> Result<Value, LlmError>
where
    F: Fn(&str) -> String,
{
    let first = truncate_chars(text, MAX_TEXT_CHARS);
    match completion.complete_json(&build_prompt(first), system).await {
        Err(LlmError::PayloadTooLarge) => {
            warn!(
                "Parse payload too large ({} chars); retrying with the first {} chars",
                first.chars().count(),
                REDUCED_TEXT_CHARS
            );
            let reduced = truncate_chars(text, REDUCED_TEXT_CHARS);
            completion.complete_json(&build_prompt(reduced), system).await
        }
        other => other,
    }
}

/// Longest prefix of `text` with at most `max` chars, cut on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The model sometimes omits an empty section; give it the placeholder a caller
/// would have to send. Non-object replies are left alone and fail normalization.
fn fill_required_placeholders(value: &mut Value) {
    if let Value::Object(map) = value {
        for field in REQUIRED_FIELDS {
            map.entry(field).or_insert(Value::Null);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeCompletion {
        max_prompt_len: usize,
        reply: Value,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeCompletion {
        fn new(max_prompt_len: usize, reply: Value) -> Self {
            Self {
                max_prompt_len,
                reply,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Completion for FakeCompletion {
        async fn complete_json(&self, prompt: &str, _system: &str) -> Result<Value, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if prompt.len() > self.max_prompt_len {
                return Err(LlmError::PayloadTooLarge);
            }
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_parse_resume_normalizes_reply() {
        let fake = FakeCompletion::new(
            usize::MAX,
            json!({
                "name": "Ada",
                "skills": "Python, Django",
                "experience": [{"role": "Engineer", "start_date": "2021-03", "end_date": "Present"}]
            }),
        );
        let profile = parse_resume(&fake, "Ada — Python engineer").await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(profile.skills, vec!["Python", "Django"]);
        assert_eq!(profile.experience.len(), 1);
        assert!(profile.education.is_empty());
        assert!(profile.certifications.is_empty());
    }

    #[tokio::test]
    async fn test_parse_resume_rejects_non_object_reply() {
        let fake = FakeCompletion::new(usize::MAX, json!(["not", "an", "object"]));
        let err = parse_resume(&fake, "text").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCandidate(_)));
    }

    #[tokio::test]
    async fn test_parse_job_retries_once_with_reduced_text() {
        let long_text = "Rust ".repeat(5_000);
        let fake = FakeCompletion::new(
            REDUCED_TEXT_CHARS + 2_000,
            json!({"title": "Rust Engineer", "keywords": ["Rust", "Tokio"]}),
        );
        let job = parse_job(&fake, &long_text).await.unwrap();
        assert_eq!(job.keywords, vec!["Rust", "Tokio"]);

        let prompts = fake.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].len() < prompts[0].len());
    }

    #[tokio::test]
    async fn test_parse_job_gives_up_after_one_reduction() {
        let fake = FakeCompletion::new(10, json!({}));
        let err = parse_job(&fake, "Rust engineer").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(fake.prompts.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("résumé", 2), "ré");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
