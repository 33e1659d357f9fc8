mod config;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::generator::LlmQuestionGenerator;
use crate::interview::registry::InterviewRegistry;
use crate::interview::scorer::LlmAnswerGrader;
use crate::interview::template::Template;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on a missing provider API key)
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

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Template errors stop startup before any interview can begin
    let template = Template::load(&config.template_path)
        .with_context(|| format!("Failed to load interview template {}", config.template_path))?;
    info!(
        "Template loaded: {} ({} sections, {} questions)",
        template.role,
        template.sections.len(),
        template.total_questions()
    );

    // Initialize LLM client
    let llm = LlmClient::new(
        config.provider,
        config.api_key.clone(),
        config.model.clone(),
        config.temperature,
    );
    info!(
        "LLM client initialized (provider: {:?}, model: {})",
        config.provider,
        llm.model()
    );

    // Build app state
    let state = AppState {
        interviews: InterviewRegistry::new(),
        template: Arc::new(template),
        generator: Arc::new(LlmQuestionGenerator(llm.clone())),
        grader: Arc::new(LlmAnswerGrader(llm)),
        default_max_followups: config.max_followups,
    };

    // Idle interviews are dropped in the background
    let ttl = Duration::from_secs(config.interview_ttl_minutes.saturating_mul(60));
    let _sweeper = state.interviews.spawn_sweeper(ttl);
    info!("Interview TTL: {} min", config.interview_ttl_minutes);

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()), // TODO: restrict origins once the web front-end has a fixed host
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
