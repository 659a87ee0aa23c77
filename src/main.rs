use anyhow::{Context, Result};
use std::sync::Arc;
use totem::api::{create_pets_router, PetsAppState};
use totem::config::load_from_env;
use totem::nats::{run_bridge, Hook, NatsClient, NatsPublisher};
use totem::relay::{MemoryDatabase, TotemRelay};
use totem::status::{run_decay_loop, run_status_loop};
use totem::totem::Totem;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "totem=info".into()),
        )
        .init();

    info!("Totem starting...");

    let config = load_from_env()?;
    info!(
        nats_url = %config.nats.url,
        subject_prefix = %config.nats.subject_prefix,
        bind_addr = %config.api.bind_addr,
        "Configuration loaded"
    );

    let totem = Arc::new(Totem::new(config.pets.publish_timeout()));
    let relay = Arc::new(TotemRelay::new(
        config.relay.clone(),
        Arc::clone(&totem),
        Arc::new(MemoryDatabase::new()),
    ));

    // Outbound events go back to the relay over NATS
    let nats = NatsClient::connect(config.nats.clone()).await?;
    totem.set_publisher(Arc::new(NatsPublisher::new(
        nats.client().clone(),
        config.nats.subject(Hook::PUBLISH_SUFFIX),
    )));

    let bridge_handle = tokio::spawn(run_bridge(
        Arc::clone(&relay),
        nats.client().clone(),
        config.nats.clone(),
    ));

    let decay_handle = tokio::spawn(run_decay_loop(
        Arc::clone(&totem),
        config.pets.decay_interval(),
    ));
    let status_handle = tokio::spawn(run_status_loop(
        Arc::clone(&totem),
        config.pets.status_interval(),
    ));

    // Start HTTP API server
    let api_state = Arc::new(PetsAppState {
        totem: Arc::clone(&totem),
        relay_info: config.relay.clone(),
    });
    let router = create_pets_router(api_state).layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(&config.api.bind_addr)
        .await
        .context("Failed to bind API address")?;
    info!(bind_addr = %config.api.bind_addr, "Inspection API listening");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!(error = %e, "API server error");
        }
    });

    tokio::select! {
        result = bridge_handle => match result {
            Ok(Ok(())) => info!("Relay bridge stopped"),
            Ok(Err(e)) => error!(error = %format!("{:#}", e), "Relay bridge failed"),
            Err(e) => error!(error = %e, "Relay bridge task panicked"),
        },
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl_c signal")?;
            info!("Shutdown signal received");
        }
    }

    // Graceful shutdown
    server_handle.abort();
    decay_handle.abort();
    status_handle.abort();
    info!(pets = totem.len(), "Totem stopped");

    Ok(())
}
