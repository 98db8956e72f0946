mod config;
mod media;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env file is normal outside development.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {e}");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")))
        .init();

    let config = config::ServerConfig::from_env().expect("invalid server configuration");

    let source = media::YouTubeSource::new(config.youtube_base_url.clone(), config.timeouts)
        .expect("failed to build upstream HTTP client");
    tracing::info!(
        upstream = source.base_url(),
        request_timeout_secs = config.timeouts.request_secs,
        connect_timeout_secs = config.timeouts.connect_secs,
        "video source initialized"
    );

    let state = state::AppState::new(Arc::new(source));
    let app = routes::app(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "scrapbook server listening");
    axum::serve(listener, app).await.expect("server failed");
}
