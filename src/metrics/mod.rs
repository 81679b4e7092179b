// Private module declaration
mod server;

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order generation (throughput, failures, capacity cooldowns)
// - Order cleanup (removed orders, failed sweeps)
// - Order population (last observed index size)
// - Courier movement and zone corrections
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Generation Metrics
    pub orders_generated: IntCounter,
    pub order_generation_failures: IntCounter,
    pub order_generation_cooldowns: IntCounter,

    // Cleanup Metrics
    pub orders_removed: IntCounter,
    pub order_cleanup_failures: IntCounter,

    // Population
    pub orders_active: IntGauge,

    // Courier Metrics
    pub courier_moves: IntCounterVec,
    pub courier_relocations: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_generated = IntCounter::new(
            "orders_generated_total",
            "Total orders generated by the generation worker",
        )?;
        registry.register(Box::new(orders_generated.clone()))?;

        let order_generation_failures = IntCounter::new(
            "order_generation_failures_total",
            "Generation ticks that failed on count read or order generation",
        )?;
        registry.register(Box::new(order_generation_failures.clone()))?;

        let order_generation_cooldowns = IntCounter::new(
            "order_generation_cooldowns_total",
            "Times the generation worker backed off at capacity",
        )?;
        registry.register(Box::new(order_generation_cooldowns.clone()))?;

        let orders_removed = IntCounter::new(
            "orders_removed_total",
            "Total expired orders removed by the cleanup worker",
        )?;
        registry.register(Box::new(orders_removed.clone()))?;

        let order_cleanup_failures = IntCounter::new(
            "order_cleanup_failures_total",
            "Cleanup sweeps that failed",
        )?;
        registry.register(Box::new(order_cleanup_failures.clone()))?;

        let orders_active = IntGauge::new(
            "orders_active",
            "Order count last observed in the geospatial index",
        )?;
        registry.register(Box::new(orders_active.clone()))?;

        let courier_moves = IntCounterVec::new(
            Opts::new("courier_moves_total", "Courier move commands applied"),
            &["direction"],
        )?;
        registry.register(Box::new(courier_moves.clone()))?;

        let courier_relocations = IntCounter::new(
            "courier_relocations_total",
            "Times the courier was relocated back into the admissible area",
        )?;
        registry.register(Box::new(courier_relocations.clone()))?;

        Ok(Self {
            registry,
            orders_generated,
            order_generation_failures,
            order_generation_cooldowns,
            orders_removed,
            order_cleanup_failures,
            orders_active,
            courier_moves,
            courier_relocations,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_count(&self, count: usize) {
        self.orders_active.set(i64::try_from(count).unwrap_or(i64::MAX));
    }

    pub fn record_orders_removed(&self, removed: usize) {
        self.orders_removed.inc_by(removed as u64);
    }

    pub fn record_courier_move(&self, direction: &str) {
        self.courier_moves.with_label_values(&[direction]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert!(metrics.registry.gather().len() >= 7);
    }

    #[test]
    fn test_record_orders_removed() {
        let metrics = Metrics::new().unwrap();
        metrics.record_orders_removed(3);
        metrics.record_orders_removed(0);

        assert_eq!(metrics.orders_removed.get(), 3);
    }

    #[test]
    fn test_record_order_count() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_count(150);
        assert_eq!(metrics.orders_active.get(), 150);
    }

    #[test]
    fn test_courier_moves_by_direction() {
        let metrics = Metrics::new().unwrap();
        metrics.record_courier_move("up");
        metrics.record_courier_move("up");
        metrics.record_courier_move("left");

        assert_eq!(metrics.courier_moves.with_label_values(&["up"]).get(), 2);
        assert_eq!(metrics.courier_moves.with_label_values(&["left"]).get(), 1);
    }
}
