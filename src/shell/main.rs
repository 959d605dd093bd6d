use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use live_roster::modules::live_roster::session::{LiveRosterSession, SessionPorts};
use live_roster::shared::infrastructure::auth::{AccessTokenProvider, StaticToken};
use live_roster::shared::infrastructure::backend::http::HttpRosterBackend;
use live_roster::shared::infrastructure::notifications::TracingNotifier;
use live_roster::shared::infrastructure::realtime::websocket::WebSocketTransport;
use live_roster::shell::config::Config;
use live_roster::shell::http::router;
use live_roster::shell::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;
    let tokens: Arc<dyn AccessTokenProvider> =
        Arc::new(StaticToken::new(config.access_token.clone()));
    let backend = Arc::new(
        HttpRosterBackend::new(&config.api_url, tokens.clone(), config.http_timeout)
            .context("building the backend client")?,
    );
    let transport = Arc::new(
        WebSocketTransport::new(&config.ws_url, tokens).context("building the realtime transport")?,
    );

    let ports = SessionPorts {
        backend: backend.clone(),
        catalog: backend,
        transport,
        notifier: Arc::new(TracingNotifier),
    };
    let session = Arc::new(
        LiveRosterSession::mount(config.room_id.as_str(), ports, config.session_options()).await?,
    );

    let app = router(AppState {
        session: session.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!(
        room_id = %config.room_id,
        "roster endpoints on http://{}, GraphQL on /gql",
        config.bind
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await?;

    session.close().await;
    Ok(())
}
