use std::sync::Arc;

use sms_panel::api::{self, AppState};
use sms_panel::config::AppConfig;
use sms_panel::dispatch::DispatchSession;
use sms_panel::gateway::ComteleGateway;
use sms_panel::llm::GeminiGenerator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("📨 SMS Panel v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}:{}/api", config.bind_address, config.port);
    eprintln!("   Comtele: {}", config.comtele.url);
    eprintln!("   Group size: {}", config.group_size);
    if config.comtele.auth_key.is_none() {
        eprintln!("   Warning: COMTELE_AUTH_KEY not set; sends will be refused");
    }
    if config.gemini.api_key.is_none() {
        eprintln!("   Warning: GEMINI_API_KEY not set; /api/gemini will fail");
    }

    let gateway = Arc::new(ComteleGateway::new(config.comtele.clone())?);
    let session = DispatchSession::new(gateway, config.group_size);
    let llm = Arc::new(GeminiGenerator::new(config.gemini.clone()));
    let app = api::router(AppState::new(session, llm));

    let listener =
        tokio::net::TcpListener::bind((config.bind_address.as_str(), config.port)).await?;
    tracing::info!(port = config.port, "API server started");
    axum::serve(listener, app).await?;

    Ok(())
}
