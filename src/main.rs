//! IntelliChain - conversational Web3 assistant
//!
//! A Rust backend implementing a chat session state machine that turns
//! natural-language requests into transaction previews and simulated
//! submissions.

mod api;
mod backend;
mod config;
mod intent;
mod runtime;
mod session;
mod store;

use api::{create_router, AppState};
use backend::{KeywordClassifier, SimulatedSubmitter, NETWORK_NAME};
use config::Config;
use intent::RuleTable;
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use store::MemoryStore;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intellichain=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        classify_delay_ms = %config.classify_delay.as_millis(),
        submit_delay_ms = %config.submit_delay.as_millis(),
        seeded = config.rng_seed.is_some(),
        network = NETWORK_NAME,
        "Configuration loaded"
    );

    // Simulated backends
    let classifier = KeywordClassifier::new(
        RuleTable::default(),
        config.classify_delay,
        config.rng_seed,
    );
    let submitter = SimulatedSubmitter::new(config.submit_delay, config.rng_seed);

    let port = config.port;
    let state = AppState::new(SessionManager::new(
        MemoryStore::new(),
        Arc::new(classifier),
        Arc::new(submitter),
        config,
    ));
    let sessions = state.sessions.clone();

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("IntelliChain server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sessions.shutdown();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
