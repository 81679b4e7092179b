use std::sync::Arc;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::GenerationConfig;
use crate::domain::order::OrderService;
use crate::metrics::Metrics;

// ============================================================================
// Order Generator - Keeps the order population topped up
// ============================================================================
//
// Every tick:
// 1. Read the current order count
// 2. Below capacity: generate one order
// 3. At capacity: back off for the cooldown, then resume normal ticks
//
// Count-then-generate is not atomic, so the population can briefly overshoot
// the cap by a few orders. Errors are logged and the loop keeps going.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickOutcome {
    Generated,
    AtCapacity,
    Failed,
}

pub struct OrderGenerator {
    orders: Arc<OrderService>,
    config: GenerationConfig,
    metrics: Arc<Metrics>,
}

impl OrderGenerator {
    pub fn new(orders: Arc<OrderService>, config: GenerationConfig, metrics: Arc<Metrics>) -> Self {
        Self { orders, config, metrics }
    }

    async fn tick(&self) -> TickOutcome {
        let count = match self.orders.get_count().await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Failed to get order count");
                self.metrics.order_generation_failures.inc();
                return TickOutcome::Failed;
            }
        };
        self.metrics.record_order_count(count);

        if count >= self.config.capacity {
            return TickOutcome::AtCapacity;
        }

        match self.orders.generate_order().await {
            Ok(_) => {
                self.metrics.orders_generated.inc();
                TickOutcome::Generated
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to generate order");
                self.metrics.order_generation_failures.inc();
                TickOutcome::Failed
            }
        }
    }

    /// Run until `shutdown` is cancelled. A tick already in progress finishes
    /// its store calls before the loop exits.
    pub async fn run(self, shutdown: CancellationToken) {
        tracing::info!(
            interval_ms = self.config.interval_ms,
            capacity = self.config.capacity,
            "🔄 Order generator started"
        );

        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if self.tick().await == TickOutcome::AtCapacity {
                self.metrics.order_generation_cooldowns.inc();
                tracing::debug!(
                    capacity = self.config.capacity,
                    cooldown_secs = self.config.cooldown_secs,
                    "Order capacity reached, cooling down"
                );

                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = sleep(self.config.cooldown()) => {}
                }
                ticker.reset();
            }
        }

        tracing::info!("🛑 Order generator stopped");
    }
}
