//! External scorer: asks the text-generation service for a candidate score.
//!
//! The returned value is untrusted: it goes straight to the score validator and is
//! never used without checking. Failures come back as `Err` so the pipeline can
//! pick its local fallback explicitly.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;

use crate::llm_client::{Completion, LlmError};
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::screening::prompts::{
    SCORE_PROMPT_TEMPLATE, SCORE_SYSTEM, SKILLS_ONLY_SCORE_PROMPT_TEMPLATE,
};

/// Carried in `AppState` as `Option<Arc<dyn ExternalScorer>>`.
#[async_trait]
pub trait ExternalScorer: Send + Sync {
    /// Returns the raw score value exactly as the service produced it.
    async fn score(&self, candidate: &CandidateProfile, job: &JobPosting)
        -> Result<Value, LlmError>;
}

/// Scores via the LLM. Falls back once to a skills-only payload when the full
/// candidate is too large.
pub struct LlmScorer<C> {
    completion: C,
}

impl<C: Completion> LlmScorer<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }

    async fn ask(&self, prompt: &str) -> Result<Value, LlmError> {
        let reply = self.completion.complete_json(prompt, SCORE_SYSTEM).await?;
        Ok(extract_score(reply))
    }
}

#[async_trait]
impl<C: Completion> ExternalScorer for LlmScorer<C> {
    async fn score(
        &self,
        candidate: &CandidateProfile,
        job: &JobPosting,
    ) -> Result<Value, LlmError> {
        match self.ask(&full_prompt(candidate, job)?).await {
            Err(LlmError::PayloadTooLarge) => {
                warn!(
                    "Candidate payload too large for external scoring; retrying with skills only ({} skills)",
                    candidate.skills.len()
                );
                self.ask(&skills_only_prompt(candidate, job)?).await
            }
            other => other,
        }
    }
}

/// The score may come back as `{"score": n, ...}` or as a bare value. A missing
/// score becomes `null`, which the validator rejects.
fn extract_score(reply: Value) -> Value {
    match reply {
        Value::Object(mut map) => map.remove("score").unwrap_or(Value::Null),
        other => other,
    }
}

fn full_prompt(candidate: &CandidateProfile, job: &JobPosting) -> Result<String, LlmError> {
    Ok(SCORE_PROMPT_TEMPLATE
        .replace("{candidate_json}", &serde_json::to_string(candidate)?)
        .replace("{job_json}", &serde_json::to_string(job)?))
}

fn skills_only_prompt(candidate: &CandidateProfile, job: &JobPosting) -> Result<String, LlmError> {
    Ok(SKILLS_ONLY_SCORE_PROMPT_TEMPLATE
        .replace("{skills_json}", &json!(candidate.skills).to_string())
        .replace("{keywords_json}", &json!(job.keywords).to_string()))
}
