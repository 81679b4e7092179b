use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use geo_courier::config::{Config, StoreBackend};
use geo_courier::domain::courier::CourierService;
use geo_courier::domain::order::OrderService;
use geo_courier::domain::CourierFacade;
use geo_courier::metrics;
use geo_courier::storage::{
    self, CourierStorage, InMemoryCourierStorage, InMemoryOrderStorage, OrderStorage, RedisCourierStorage,
    RedisOrderStorage,
};
use geo_courier::utils::{retry_with_backoff, RetryConfig, RetryResult};
use geo_courier::workers::WorkerCoordinator;

type Stores = (Arc<dyn OrderStorage>, Arc<dyn CourierStorage>);

async fn open_stores(config: &Config) -> anyhow::Result<Stores> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, state is lost on restart");
            Ok((Arc::new(InMemoryOrderStorage::new()), Arc::new(InMemoryCourierStorage::new())))
        }
        StoreBackend::Redis => {
            let url = config.store.redis_url.as_str();
            tracing::info!(url = url, "Connecting to Redis...");

            let conn = match retry_with_backoff(RetryConfig::default(), |_| storage::connect(url)).await {
                RetryResult::Success(conn) => conn,
                RetryResult::Failed { error, attempts } => {
                    return Err(error).with_context(|| format!("Redis unreachable after {} attempts", attempts));
                }
            };

            tracing::info!("✅ Connected to Redis");
            Ok((
                Arc::new(RedisOrderStorage::new(conn.clone())),
                Arc::new(RedisCourierStorage::new(conn)),
            ))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,geo_courier=debug")))
        .init();

    tracing::info!("🚀 Starting geofenced courier simulator");

    // === 1. Configuration and zones ===
    let config = Config::from_env().context("Invalid configuration")?;
    let zones = Arc::new(config.load_zones().context("Invalid zone definition")?);
    tracing::info!(
        disallowed_zones = zones.disallowed().len(),
        zones_file = ?config.zones_file,
        "🗺️ Zones loaded"
    );

    // === 2. Stores ===
    let (order_storage, courier_storage) = open_stores(&config).await?;

    // === 3. Prometheus metrics ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // actix-web gets its own runtime on a dedicated thread
    let registry = metrics.registry().clone();
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build metrics runtime");
                return;
            }
        };
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(registry, metrics_port).await {
                tracing::error!(error = %e, "Metrics server error");
            }
        });
    });

    // === 4. Services ===
    let orders = Arc::new(OrderService::new(order_storage, zones.clone(), config.orders.clone()));
    let couriers = Arc::new(CourierService::new(
        courier_storage,
        zones.clone(),
        config.courier.start,
        metrics.clone(),
    ));
    let facade = CourierFacade::new(couriers, orders.clone(), config.courier.clone());

    let status = facade.get_status().await.context("Failed to load courier")?;
    tracing::info!(
        lat = status.courier.location.lat,
        lng = status.courier.location.lng,
        visible_orders = status.orders.len(),
        "🛵 Courier ready"
    );

    // === 5. Background workers ===
    let coordinator = WorkerCoordinator::start(orders, config.generation.clone(), config.cleanup.clone(), metrics);

    tokio::signal::ctrl_c().await.context("Failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    coordinator.shutdown().await;
    tracing::info!("👋 Bye");

    Ok(())
}
