use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{TimeDelta, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    accounts::AccountService,
    config::Config,
    generator::ReadingsGenerator,
    handlers::{self, AppState},
    metrics,
    pricing::PricePlanCatalog,
    request_metrics::track_requests,
    signals::setup_signal_handlers,
    store::ReadingStore,
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Start the JOI Energy server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Sets up signal handlers for graceful shutdown
/// 3. Builds and seeds the application state
/// 4. Binds to the configured address
/// 5. Serves requests with graceful shutdown support
pub async fn start_server(config: Config) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let (shutdown_tx, signal_handle) = setup_signal_handlers();
    let mut shutdown_rx = shutdown_tx.subscribe();

    let state = build_state(&config)?;
    let app = create_router(state.clone(), metrics_handle, &config.metrics.endpoint);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    info!("Starting JOI Energy on {}", addr);
    info!(
        "Configuration: {} price plans, {} accounts, {} seeded meters",
        state.catalog.len(),
        state.accounts.len(),
        state.store.meter_count()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

/// Build the catalog, account map and store from configuration, seeding every
/// account meter with synthetic readings that end now
pub fn build_state(config: &Config) -> Result<AppState> {
    let catalog = Arc::new(PricePlanCatalog::new(config.price_plans()));
    let accounts = Arc::new(AccountService::new(&config.accounts));
    let store = Arc::new(ReadingStore::new());

    let readings_per_meter = config.seed.readings_per_meter;
    if readings_per_meter > 0 {
        let interval = TimeDelta::try_seconds(config.seed.reading_interval_seconds)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Seed reading interval out of range: {}",
                    config.seed.reading_interval_seconds
                )
            })?;
        let generator = ReadingsGenerator::new(interval);
        let end = Utc::now();
        for meter_id in accounts.smart_meter_ids() {
            store.append(meter_id, generator.generate(readings_per_meter, end))?;
        }
        info!(
            meters = accounts.len(),
            readings_per_meter, "Seeded smart meter readings"
        );
    }

    Ok(AppState::new(store, catalog, accounts))
}

/// Create the Axum router with all routes and middleware
pub fn create_router(
    state: AppState,
    metrics_handle: Option<Arc<PrometheusHandle>>,
    metrics_endpoint: &str,
) -> Router {
    let api_routes = Router::new()
        .route("/readings/store", post(handlers::readings::store_readings))
        .route(
            "/readings/read/:smart_meter_id",
            get(handlers::readings::read_readings),
        )
        .route(
            "/price-plans/compare-all/:smart_meter_id",
            get(handlers::price_plans::compare_all),
        )
        .route(
            "/price-plans/recommend/:smart_meter_id",
            get(handlers::price_plans::recommend),
        )
        .route(
            "/price-plans/peak-multipliers",
            get(handlers::peak_multipliers::all_peak_multipliers),
        )
        .route(
            "/price-plans/:plan_id/peak-multiplier",
            get(handlers::peak_multipliers::list_peak_multipliers)
                .post(handlers::peak_multipliers::add_peak_multipliers),
        )
        .route_layer(middleware::from_fn(track_requests))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(state);

    let mut app = api_routes;
    if let Some(handle) = metrics_handle {
        app = app.merge(
            Router::new()
                .route(metrics_endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        );
    }

    app
        // Reading batches are small; cap bodies at 1 MiB
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
