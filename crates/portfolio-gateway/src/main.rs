//! Portfolio chatbot gateway: serves the portfolio record and proxies chat turns
//! to the upstream completion API with per-session history.

mod routes;
mod session_cookie;

use portfolio_core::{
    ChatConfig, ChatGateway, InMemorySessionStore, OpenRouterClient, PortfolioStore, SessionStore,
    SystemPrompt,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::routes::{build_app, AppState};
use crate::session_cookie::CookieSigner;

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[portfolio-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "gateway stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = ChatConfig::load()?;
    tracing::info!(config = ?cfg, "configuration loaded");

    if cfg.uses_placeholder_secret() {
        tracing::warn!("SECRET_KEY not set; using the insecure development placeholder");
    }
    if cfg.openrouter_api_key.is_empty() {
        tracing::warn!("OPENROUTER_API_KEY not set; chat requests will fail upstream");
    }

    let portfolio = PortfolioStore::load(cfg.portfolio_path.as_deref())?;
    let prompt = Arc::new(SystemPrompt::build(portfolio.get()));
    tracing::info!(
        owner = %portfolio.get().name,
        prompt_chars = prompt.as_str().len(),
        "system prompt built"
    );

    let sessions: Arc<dyn SessionStore> =
        Arc::new(InMemorySessionStore::new(cfg.max_turns, cfg.session_ttl()));
    let client = Arc::new(OpenRouterClient::from_config(&cfg)?);
    tracing::info!(model = client.model(), "upstream client ready");

    let gateway = ChatGateway::new(prompt, Arc::clone(&sessions), client)
        .with_failure_policy(cfg.failure_policy);
    let cookies = CookieSigner::new(&cfg.secret_key, cfg.session_ttl())
        .map_err(|e| format!("session signing key: {}", e))?;

    spawn_session_sweeper(Arc::clone(&sessions), cfg.session_sweep_interval());

    let state = Arc::new(AppState {
        gateway,
        portfolio,
        cookies,
    });
    let app = build_app(state);

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "portfolio gateway listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drops sessions idle past their TTL.
fn spawn_session_sweeper(sessions: Arc<dyn SessionStore>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let removed = sessions.purge_expired();
            if removed > 0 {
                tracing::info!(removed, active = sessions.len(), "expired sessions purged");
            }
        }
    });
}
