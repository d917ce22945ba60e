use tracing_subscriber::EnvFilter;

use talk_search::api;
use talk_search::config::Config;
use talk_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Mode: {}", config.mode);
    tracing::info!("Backend origin: {}", config.backend_origin());
    tracing::info!(
        "Proxying {}* -> {}",
        config.backend.proxy_prefix,
        config.backend_origin()
    );

    let state = AppState::new(config.clone())?;

    if config.panel.auto_mount {
        let panel = state.panel.clone();
        tokio::spawn(async move {
            panel.mount().await;
        });
    }

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
