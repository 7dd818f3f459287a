use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use wayfarer::api::create_router;
use wayfarer::client::BackendClient;
use wayfarer::config::load_or_default;
use wayfarer::coordinator::Coordinator;
use wayfarer::location::NominatimGeocoder;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wayfarer=info".into()),
        )
        .init();

    info!("Wayfarer starting...");

    let config_path =
        std::env::var("WAYFARER_CONFIG").unwrap_or_else(|_| "wayfarer.toml".to_string());
    let config = load_or_default(&config_path).context("Failed to load configuration")?;

    info!(
        api_url = %config.backend.api_url,
        hotel_api_url = %config.backend.hotel_api_url(),
        geocoder = %config.geocoder.base_url,
        port = config.server.port,
        categories = config.search.categories.len(),
        "Configuration loaded"
    );

    let backend = Arc::new(
        BackendClient::new(&config.backend).context("Failed to build backend client")?,
    );
    let geocoder = Arc::new(
        NominatimGeocoder::new(&config.geocoder).context("Failed to build geocoder client")?,
    );
    let coordinator = Coordinator::new(backend, geocoder, config.search.categories.clone());

    let router = create_router(coordinator);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.server.port))
        .await
        .context("Failed to bind API port")?;
    info!(port = config.server.port, "Wayfarer API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "API server error");
        }
    });

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    server_handle.abort();
    info!("Wayfarer stopped");

    Ok(())
}
