//! Axum route handlers for the Screening API.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::candidate::CandidateProfile;
use crate::models::job::JobPosting;
use crate::scoring::decision::Thresholds;
use crate::screening::external::ExternalScorer;
use crate::screening::parsing::{parse_job, parse_resume};
use crate::screening::pipeline::{
    request_external, resolve_candidate_id, BatchCandidate, RankedResult, RejectedCandidate,
    ScreeningResult,
};
use crate::state::AppState;
use crate::store::{record_all, ScreeningRecord};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    #[serde(default)]
    pub candidate_id: Option<String>,
    pub candidate: Value,
    pub job: JobPosting,
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub job: JobPosting,
    pub candidates: Vec<BatchCandidate>,
    #[serde(default)]
    pub thresholds: Option<Thresholds>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub ranked: Vec<RankedResult>,
    pub rejected: Vec<RejectedCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/screen
///
/// Screens one candidate against one job and persists the result at rank 1.
pub async fn handle_screen(
    State(state): State<AppState>,
    Json(request): Json<ScreenRequest>,
) -> Result<Json<ScreeningResult>, AppError> {
    let thresholds = resolve_thresholds(&state, request.thresholds)?;
    let profile = CandidateProfile::from_value(&request.candidate)?;
    let candidate_id = resolve_candidate_id(request.candidate_id);

    let external =
        request_external(state.external_scorer.as_deref(), &profile, &request.job).await;
    let result = state
        .engine
        .screen(&candidate_id, &profile, &request.job, external, &thresholds);

    let record = ScreeningRecord::from_result(&result, request.job.title.as_deref(), 1);
    record_all(state.store.as_ref(), &[record]).await;

    Ok(Json(result))
}

/// POST /api/v1/rank
///
/// Screens a batch concurrently and returns it ranked best-first.
/// Invalid records are listed under `rejected` instead of failing the batch.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<RankRequest>,
) -> Result<Json<RankResponse>, AppError> {
    if request.candidates.is_empty() {
        return Err(AppError::Validation(
            "candidates cannot be empty".to_string(),
        ));
    }
    let thresholds = resolve_thresholds(&state, request.thresholds)?;
    let job = Arc::new(request.job);
    let scorer: Option<Arc<dyn ExternalScorer>> = state.external_scorer.clone();

    let outcome = Arc::clone(&state.engine)
        .screen_batch(Arc::clone(&job), request.candidates, scorer, thresholds)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Screening task failed: {e}")))?;

    let records: Vec<ScreeningRecord> = outcome
        .ranked
        .iter()
        .map(|r| ScreeningRecord::from_result(&r.result, job.title.as_deref(), r.rank))
        .collect();
    record_all(state.store.as_ref(), &records).await;

    Ok(Json(RankResponse {
        ranked: outcome.ranked,
        rejected: outcome.rejected,
    }))
}

/// POST /api/v1/parse/resume
///
/// Extracts a normalized candidate profile from raw résumé text.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    Json(request): Json<ParseTextRequest>,
) -> Result<Json<CandidateProfile>, AppError> {
    let text = require_text(&request.text)?;
    let llm = require_llm(&state)?;
    Ok(Json(parse_resume(llm, text).await?))
}

/// POST /api/v1/parse/job
///
/// Extracts a job title and keyword list from raw posting text.
pub async fn handle_parse_job(
    State(state): State<AppState>,
    Json(request): Json<ParseTextRequest>,
) -> Result<Json<JobPosting>, AppError> {
    let text = require_text(&request.text)?;
    let llm = require_llm(&state)?;
    Ok(Json(parse_job(llm, text).await?))
}

fn resolve_thresholds(state: &AppState, requested: Option<Thresholds>) -> Result<Thresholds, AppError> {
    let thresholds = requested.unwrap_or(state.config.thresholds);
    thresholds.validate()?;
    Ok(thresholds)
}

fn require_text(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    Ok(text)
}

fn require_llm(state: &AppState) -> Result<&LlmClient, AppError> {
    state.llm.as_ref().ok_or_else(|| {
        AppError::UnprocessableEntity(
            "Text-generation service is not configured (set ANTHROPIC_API_KEY)".to_string(),
        )
    })
}
