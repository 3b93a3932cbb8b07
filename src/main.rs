// Curriculum console proxy server

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use curriculum_console::{app_state::AppState, config::Config, proxy::create_api_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let address = config.server_address();
    info!("Forwarding /api to {}", config.backend.base_url);
    if let Some(limit) = config.rate_limit.requests_per_minute {
        info!("Rate limit: {} requests per minute per client", limit);
    }

    let app = create_api_router(AppState::new(config));

    let listener = TcpListener::bind(&address).await?;
    info!("Curriculum console proxy listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
