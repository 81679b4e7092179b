use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::{CleanupConfig, GenerationConfig};
use crate::domain::order::OrderService;
use crate::metrics::Metrics;

use super::{OrderCleaner, OrderGenerator};

// ============================================================================
// Worker Coordinator - Owns the background workers
// ============================================================================
//
// Responsibilities:
// - Spawns the generation and cleanup workers on a shared tracker
// - Hands every worker the same shutdown token
// - Coordinates graceful shutdown: cancel, then wait for every loop to exit
//
// ============================================================================

pub struct WorkerCoordinator {
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl Default for WorkerCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkerCoordinator {
    pub fn new() -> Self {
        Self {
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Start both order workers.
    pub fn start(
        orders: Arc<OrderService>,
        generation: GenerationConfig,
        cleanup: CleanupConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        let coordinator = Self::new();

        let generator = OrderGenerator::new(orders.clone(), generation, metrics.clone());
        coordinator.spawn("order_generator", |token| generator.run(token));

        let cleaner = OrderCleaner::new(orders, cleanup, metrics);
        coordinator.spawn("order_cleaner", |token| cleaner.run(token));

        tracing::info!(workers = coordinator.tracker.len(), "✅ All workers started");
        coordinator
    }

    pub fn spawn<F, Fut>(&self, name: &'static str, worker: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(worker = name, "Spawning worker");
        self.tracker.spawn(worker(self.shutdown.child_token()));
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn active_workers(&self) -> usize {
        self.tracker.len()
    }

    /// Cancel every worker and wait until all of them have returned.
    pub async fn shutdown(self) {
        tracing::info!(workers = self.tracker.len(), "🛑 Shutting down workers");

        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;

        tracing::info!("🛑 All workers stopped");
    }
}
