use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::CleanupConfig;
use crate::domain::order::OrderService;
use crate::metrics::Metrics;

/// Periodically sweeps orders older than the configured max age.
pub struct OrderCleaner {
    orders: Arc<OrderService>,
    config: CleanupConfig,
    metrics: Arc<Metrics>,
}

impl OrderCleaner {
    pub fn new(orders: Arc<OrderService>, config: CleanupConfig, metrics: Arc<Metrics>) -> Self {
        Self { orders, config, metrics }
    }

    async fn tick(&self) {
        match self.orders.remove_old_orders().await {
            Ok(0) => {}
            Ok(removed) => {
                self.metrics.record_orders_removed(removed);
                tracing::info!(removed = removed, "🧹 Removed old orders");
            }
            Err(e) => {
                self.metrics.order_cleanup_failures.inc();
                tracing::error!(error = %e, "Failed to remove old orders");
            }
        }
    }

    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(interval_secs = self.config.interval_secs, "🔄 Order cleaner started");

        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }

        tracing::info!("🛑 Order cleaner stopped");
    }
}
