use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::screening::external::ExternalScorer;
use crate::screening::pipeline::ScreeningEngine;
use crate::store::ResultStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Deterministic engine with the taxonomy injected once at startup.
    pub engine: Arc<ScreeningEngine>,
    /// Present only when an API key is configured and ENABLE_LLM_SCORING is on.
    pub external_scorer: Option<Arc<dyn ExternalScorer>>,
    /// Used by the parse endpoints. `None` without an API key.
    pub llm: Option<LlmClient>,
    pub store: Arc<dyn ResultStore>,
    pub config: Config,
}
