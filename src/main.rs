//! gpt_chatbots - a small chat page in front of a chat-completion API
//!
//! Serves a single web page, keeps one conversation per browser session,
//! and speaks the replies.

mod api;
mod config;
mod i18n;
mod llm;
mod runtime;
mod session;
mod state_machine;
mod tts;

use api::{create_router, AppState};
use config::{AppConfig, TTS_TIMEOUT};
use llm::{LlmService, LoggingService, OpenAIService};
use runtime::TurnRunner;
use session::{SessionSettings, SessionStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tts::{GoogleTts, SpeechSynthesizer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gpt_chatbots=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set, completion requests will be rejected");
    }

    // Outbound services
    let openai = OpenAIService::new(
        config.openai_api_key.clone().unwrap_or_default(),
        &config.openai_base_url,
        config.llm_timeout,
    )?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(openai)));
    let speech: Arc<dyn SpeechSynthesizer> =
        Arc::new(GoogleTts::new(&config.tts_base_url, TTS_TIMEOUT)?);

    tracing::info!(
        base_url = %config.openai_base_url,
        default_model = %config.default_model,
        tts_base_url = %config.tts_base_url,
        "Services initialized"
    );

    // Sessions
    let sessions = Arc::new(SessionStore::new(SessionSettings::with_model(
        config.default_model,
    )));
    let _reaper = sessions.spawn_reaper(config.session_idle);

    // Create application state
    let state = AppState::new(sessions, TurnRunner::new(llm, speech));

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("gpt_chatbots server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
