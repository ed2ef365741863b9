use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pricecheck_core::{
    config::config_path, load_bases, load_config, load_exchange_ids, load_modifiers,
    validate_config, PoePricesClient, PriceChecker, PriceEstimator, TradeClient, TradeSearcher,
};
use pricecheck_server::{api::create_router, metrics::REGISTRY, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = config_path();
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("League: {}", config.trade.league);

    // Load bootstrap data
    let modifiers = load_modifiers(&config.data.modifiers_path)
        .context("Failed to load modifier dictionary")?;
    info!("Loaded {} modifiers", modifiers.len());

    let bases = load_bases(&config.data.bases_path)
        .context("Failed to load base table")?;
    info!("Loaded {} bases", bases.len());

    // Create trade searcher
    let searcher: Arc<dyn TradeSearcher> = Arc::new(
        TradeClient::new(config.trade.clone()).context("Failed to create trade client")?,
    );
    info!("Using trade searcher: {}", searcher.name());

    let mut checker = PriceChecker::new(
        Arc::new(modifiers),
        Arc::new(bases),
        searcher,
        config.trade.league.clone(),
    )
    .with_options(config.pricing.clone());

    // Exchange ids are optional; without them currency is searched like items
    match &config.data.exchange_path {
        Some(path) => {
            let ids = load_exchange_ids(path)
                .context("Failed to load exchange ids")?;
            info!("Loaded {} exchange ids", ids.len());
            checker = checker.with_exchange_ids(Arc::new(ids));
        }
        None => info!("No exchange ids configured"),
    }

    // Create estimator if configured
    match &config.estimator {
        Some(estimator_config) => match PoePricesClient::new(estimator_config.clone()) {
            Ok(client) => {
                info!("Using price estimator: {}", client.name());
                checker = checker.with_estimator(Arc::new(client));
            }
            Err(e) => warn!("Failed to create price estimator: {}", e),
        },
        None => info!("No price estimator configured"),
    }

    // Register metrics before the first request
    once_cell::sync::Lazy::force(&REGISTRY);

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::new(checker)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
