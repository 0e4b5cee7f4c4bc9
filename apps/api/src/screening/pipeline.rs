//! Screening pipeline: one candidate against one job, end to end.
//!
//! normalize (done by the caller) → infer skills → estimate experience →
//! fit score → validate any external score → decide.
//!
//! Batches fan out one task per candidate and rank only after every task has
//! finished.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::matching::classifier::KeywordMatch;
use crate::matching::inference::{Provenance, SkillInferenceEngine};
use crate::matching::taxonomy::SkillTaxonomy;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::scoring::decision::{decide, priority, rank_by, Decision, Priority, RankKey, Thresholds};
use crate::scoring::experience::ExperienceEstimator;
use crate::scoring::fit::{FitInputs, FitScoreCalculator, MatchWeights, ScoreBreakdown, MAX_SCORE};
use crate::scoring::validator::{ScoreValidator, Verdict};
use crate::screening::external::ExternalScorer;

const MAX_MISSING_IN_RECOMMENDATION: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Inputs and outputs
// ────────────────────────────────────────────────────────────────────────────

/// What the caller got back from the external scorer, if it asked at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalScoreInput {
    NotRequested,
    Failed(String),
    Received(Value),
}

/// Where the final score came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreSource {
    AcceptedExternal,
    CorrectedExternal { external: Value, reason: String },
    LocalFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub candidate_id: String,
    pub final_score: u32,
    pub breakdown: ScoreBreakdown,
    pub decision: Decision,
    pub priority: Priority,
    pub score_source: ScoreSource,
    pub match_ratio: f64,
    pub experience_years: Option<f64>,
    pub matched_skills: Vec<KeywordMatch>,
    pub missing_skills: Vec<String>,
    pub inferred_skills: Vec<String>,
    pub explicit_skill_count: usize,
    pub recommendation: String,
}

impl ScreeningResult {
    pub fn rank_key(&self) -> RankKey {
        RankKey {
            match_ratio: self.match_ratio,
            matched_skills: self.matched_skills.len(),
            inferred_skills: self.inferred_skills.len(),
            score: self.final_score,
        }
    }
}

/// One entry of a batch request. The record stays raw until the batch validates it.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchCandidate {
    #[serde(default)]
    pub candidate_id: Option<String>,
    pub candidate: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub rank: u32,
    pub result: ScreeningResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedCandidate {
    pub index: usize,
    pub candidate_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub ranked: Vec<RankedResult>,
    pub rejected: Vec<RejectedCandidate>,
}

pub fn resolve_candidate_id(candidate_id: Option<String>) -> String {
    candidate_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Asks `scorer` for a score, turning every failure into a named input.
pub async fn request_external(
    scorer: Option<&dyn ExternalScorer>,
    profile: &CandidateProfile,
    job: &JobPosting,
) -> ExternalScoreInput {
    let Some(scorer) = scorer else {
        return ExternalScoreInput::NotRequested;
    };
    match scorer.score(profile, job).await {
        Ok(value) => ExternalScoreInput::Received(value),
        Err(e) => {
            warn!("External scoring failed, using local score: {e}");
            ExternalScoreInput::Failed(e.to_string())
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

pub struct ScreeningEngine {
    taxonomy: Arc<SkillTaxonomy>,
    weights: MatchWeights,
    reference_date: Option<NaiveDate>,
}

impl ScreeningEngine {
    pub fn new(taxonomy: Arc<SkillTaxonomy>, weights: MatchWeights) -> Self {
        Self {
            taxonomy,
            weights,
            reference_date: None,
        }
    }

    /// Pins "today" for experience estimation. Without it the current UTC date is used.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    fn estimator(&self) -> ExperienceEstimator {
        self.reference_date
            .map(ExperienceEstimator::new)
            .unwrap_or_default()
    }

    pub fn screen(
        &self,
        candidate_id: &str,
        profile: &CandidateProfile,
        job: &JobPosting,
        external: ExternalScoreInput,
        thresholds: &Thresholds,
    ) -> ScreeningResult {
        let taxonomy = self.taxonomy.as_ref();
        let skill_set = SkillInferenceEngine::new(taxonomy).infer(profile);
        let skills = skill_set.names();
        if skill_set.is_empty() {
            debug!(candidate_id, "Candidate has no explicit or inferred skills");
        } else {
            debug!(
                candidate_id,
                explicit = skill_set.with_provenance(Provenance::Explicit).len(),
                inferred = skill_set.with_provenance(Provenance::Inferred).len(),
                stack = skill_set.with_provenance(Provenance::Stack).len(),
                total = skill_set.len(),
                "Resolved candidate skill set"
            );
        }

        let estimator = self.estimator();
        let experience_years = estimator.total_years(&profile.experience);

        let fit = FitScoreCalculator::new(taxonomy, &estimator, self.weights).score(&FitInputs {
            skills: &skills,
            keywords: &job.keywords,
            experience_years,
            education: &profile.education,
            certifications: &profile.certifications,
            experience: &profile.experience,
        });

        let (final_score, score_source) = match external {
            ExternalScoreInput::NotRequested => (fit.score, ScoreSource::LocalFallback),
            ExternalScoreInput::Failed(reason) => {
                info!(candidate_id, %reason, "No external score; using local score");
                (fit.score, ScoreSource::LocalFallback)
            }
            ExternalScoreInput::Received(value) => {
                match ScoreValidator::new(taxonomy).validate(&value, &skills, &job.keywords) {
                    Verdict::Accept { score } => (score, ScoreSource::AcceptedExternal),
                    Verdict::Recompute { reason } => {
                        let reason = reason.to_string();
                        warn!(
                            "External score {} for {} overridden by local score {}: {}",
                            value, candidate_id, fit.score, reason
                        );
                        (
                            fit.score,
                            ScoreSource::CorrectedExternal {
                                external: value,
                                reason,
                            },
                        )
                    }
                }
            }
        };
        let final_score = final_score.min(MAX_SCORE);

        let decision = decide(final_score, thresholds);
        let priority = priority(decision, final_score, experience_years);
        let recommendation =
            recommendation(decision, final_score, job, &fit.partition.missing);

        ScreeningResult {
            candidate_id: candidate_id.to_string(),
            final_score,
            breakdown: fit.breakdown,
            decision,
            priority,
            score_source,
            match_ratio: fit.match_ratio,
            experience_years,
            matched_skills: fit.partition.matched(),
            missing_skills: fit.partition.missing,
            inferred_skills: skill_set.derived(),
            explicit_skill_count: profile.skills.len(),
            recommendation,
        }
    }

    /// Screens every candidate concurrently, then ranks.
    ///
    /// Structurally invalid records are reported in `rejected`. Ties in the
    /// ranking keep request order.
    pub async fn screen_batch(
        self: Arc<Self>,
        job: Arc<JobPosting>,
        candidates: Vec<BatchCandidate>,
        scorer: Option<Arc<dyn ExternalScorer>>,
        thresholds: Thresholds,
    ) -> Result<BatchOutcome, JoinError> {
        let mut rejected = Vec::new();
        let mut tasks = JoinSet::new();

        for (index, entry) in candidates.into_iter().enumerate() {
            let candidate_id = resolve_candidate_id(entry.candidate_id);
            let profile = match CandidateProfile::from_value(&entry.candidate) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("Rejected candidate record #{index} ({candidate_id}): {e}");
                    rejected.push(RejectedCandidate {
                        index,
                        candidate_id,
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            let engine = Arc::clone(&self);
            let job = Arc::clone(&job);
            let scorer = scorer.clone();
            tasks.spawn(async move {
                let external = request_external(scorer.as_deref(), &profile, &job).await;
                let result = engine.screen(&candidate_id, &profile, &job, external, &thresholds);
                (index, result)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            results.push(joined?);
        }

        // join_next yields in completion order
        results.sort_by_key(|(index, _)| *index);
        rank_by(&mut results, |(_, result)| result.rank_key());

        let ranked: Vec<RankedResult> = results
            .into_iter()
            .zip(1u32..)
            .map(|((_, result), rank)| RankedResult { rank, result })
            .collect();

        info!(
            "Screened batch for {:?}: {} ranked, {} rejected",
            job.title,
            ranked.len(),
            rejected.len()
        );

        Ok(BatchOutcome { ranked, rejected })
    }
}

/// Short human-readable summary: decision, score and up to three missing keywords.
pub fn recommendation(
    decision: Decision,
    score: u32,
    job: &JobPosting,
    missing: &[String],
) -> String {
    let verdict = match decision {
        Decision::Interview => "Recommend interview",
        Decision::Hold => "Hold for review",
        Decision::Reject => "Not a match at this time",
    };
    let mut text = format!("{verdict} (score {score}/{MAX_SCORE}).");

    if job.keywords.is_empty() {
        text.push_str(" Job lists no required skills; scored on overall skill breadth.");
    } else if missing.is_empty() {
        text.push_str(" Covers every required skill.");
    } else {
        let shown: Vec<&str> = missing
            .iter()
            .take(MAX_MISSING_IN_RECOMMENDATION)
            .map(String::as_str)
            .collect();
        text.push_str(&format!(" Missing: {}", shown.join(", ")));
        if missing.len() > shown.len() {
            text.push_str(&format!(" and {} more", missing.len() - shown.len()));
        }
        text.push('.');
    }
    text
}
