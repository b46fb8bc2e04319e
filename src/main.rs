mod config;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::ServerConfig::from_env();
    let state = state::AppState::new(config);

    // Spawn background idle sweep.
    let _sweep = services::sweep::spawn_idle_sweep(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, poll_timeout_ms = config.poll_timeout.as_millis(), "chatroom listening");
    axum::serve(listener, app).await
}
