mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod scoring;
mod screening;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::llm_client::LlmClient;
use crate::matching::taxonomy::SkillTaxonomy;
use crate::routes::build_router;
use crate::screening::external::{ExternalScorer, LlmScorer};
use crate::screening::pipeline::ScreeningEngine;
use crate::state::AppState;
use crate::store::{LogResultStore, PgResultStore, ResultStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screening API v{}", env!("CARGO_PKG_VERSION"));

    // Taxonomy is built once and shared read-only by every request
    let mut taxonomy = SkillTaxonomy::standard();
    if let Some(len) = config.category_min_substring_len {
        info!("Database-category substring lookups ignore terms shorter than {len}");
        taxonomy = taxonomy.with_min_substring_len(len);
    }
    let taxonomy = Arc::new(taxonomy);
    let mut engine = ScreeningEngine::new(taxonomy, config.match_weights);
    if let Some(date) = config.reference_date {
        info!("Experience is estimated as of {date}");
        engine = engine.with_reference_date(date);
    }
    let engine = Arc::new(engine);
    info!(
        "Screening engine ready (interview >= {}, hold >= {}, related weight {}, missing penalty {})",
        config.thresholds.interview,
        config.thresholds.hold,
        config.match_weights.related,
        config.match_weights.missing_penalty
    );

    // Persistence: PostgreSQL when configured, log-only otherwise
    let store: Arc<dyn ResultStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgResultStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; screening results will only be logged");
            Arc::new(LogResultStore)
        }
    };

    // LLM client (optional)
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; parse endpoints and external scoring disabled");
            None
        }
    };

    let external_scorer: Option<Arc<dyn ExternalScorer>> = match (&llm, config.enable_llm_scoring) {
        (Some(client), true) => {
            info!("External LLM scoring enabled; scores are validated before use");
            Some(Arc::new(LlmScorer::new(client.clone())))
        }
        (None, true) => {
            warn!("ENABLE_LLM_SCORING is set but no API key is configured; using local scores");
            None
        }
        _ => None,
    };

    // Build app state
    let state = AppState {
        engine,
        external_scorer,
        llm,
        store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
