//! Server wiring: text provider, coordinator task, router and listener.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{handler, signal::shutdown_signal, state::AppState};
use crate::{
    config::ServerConfig,
    domain::TextProvider,
    error::ServerError,
    infrastructure::text_provider::{FixedTextProvider, HttpTextProvider},
    usecase::RaceCoordinator,
};

/// Run the server until Ctrl-C or SIGTERM.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let text_provider = build_text_provider(&config)?;
    let (coordinator, coordinator_task) = RaceCoordinator::spawn(text_provider);
    let app = router(Arc::new(AppState::new(coordinator)));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("Listening on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // The coordinator keeps a sender to itself, so it has to be stopped explicitly
    coordinator_task.abort();
    served.map_err(ServerError::Serve)?;
    tracing::info!("Server stopped");
    Ok(())
}

/// HTTP routes of the server
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(handler::websocket_handler))
        .route("/api/health", get(handler::health_check))
        .route("/api/race", get(handler::race_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_text_provider(config: &ServerConfig) -> Result<Arc<dyn TextProvider>, ServerError> {
    match &config.text_url {
        Some(url) => {
            let provider = HttpTextProvider::new(url.clone(), config.text_timeout())?;
            tracing::info!("Race texts from {}", provider.url());
            Ok(Arc::new(provider))
        }
        None => {
            tracing::info!("No text service configured, using the built-in text");
            Ok(Arc::new(FixedTextProvider::default()))
        }
    }
}
