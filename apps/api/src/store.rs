//! Persistence collaborator: receives final screening records. Write-only:
//! nothing in the service reads them back.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::scoring::decision::{Decision, Priority};
use crate::scoring::fit::ScoreBreakdown;
use crate::screening::pipeline::ScreeningResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningRecord {
    pub candidate_id: String,
    pub job_title: Option<String>,
    pub final_score: u32,
    pub breakdown: ScoreBreakdown,
    pub decision: Decision,
    pub priority: Priority,
    pub rank: u32,
}

impl ScreeningRecord {
    pub fn from_result(result: &ScreeningResult, job_title: Option<&str>, rank: u32) -> Self {
        Self {
            candidate_id: result.candidate_id.clone(),
            job_title: job_title.map(str::to_string),
            final_score: result.final_score,
            breakdown: result.breakdown.clone(),
            decision: result.decision,
            priority: result.priority,
            rank,
        }
    }
}

/// Carried in `AppState` as `Arc<dyn ResultStore>`.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn record(&self, record: &ScreeningRecord) -> Result<(), AppError>;
}

/// Stores every record, logging failures instead of returning them.
pub async fn record_all(store: &dyn ResultStore, records: &[ScreeningRecord]) -> usize {
    let mut stored = 0;
    for record in records {
        match store.record(record).await {
            Ok(()) => stored += 1,
            Err(e) => error!(
                "Failed to persist screening result for {}: {e}",
                record.candidate_id
            ),
        }
    }
    stored
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ────────────────────────────────────────────────────────────────────────────

pub struct PgResultStore {
    pool: PgPool,
}

impl PgResultStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultStore for PgResultStore {
    async fn record(&self, record: &ScreeningRecord) -> Result<(), AppError> {
        let breakdown = serde_json::to_value(&record.breakdown).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to serialize ScoreBreakdown: {e}"))
        })?;

        sqlx::query(
            r#"
            INSERT INTO screening_results
                (id, candidate_id, job_title, final_score, breakdown, decision, priority, rank)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&record.candidate_id)
        .bind(&record.job_title)
        .bind(record.final_score as i32)
        .bind(&breakdown)
        .bind(record.decision.as_str())
        .bind(record.priority.as_str())
        .bind(record.rank as i32)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Log-only (no database configured)
// ────────────────────────────────────────────────────────────────────────────

pub struct LogResultStore;

#[async_trait]
impl ResultStore for LogResultStore {
    async fn record(&self, record: &ScreeningRecord) -> Result<(), AppError> {
        info!(
            candidate_id = %record.candidate_id,
            job_title = ?record.job_title,
            score = record.final_score,
            decision = record.decision.as_str(),
            priority = record.priority.as_str(),
            rank = record.rank,
            "Screening result"
        );
        Ok(())
    }
}
