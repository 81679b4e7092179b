// ============================================================================
// Background Workers
// ============================================================================
//
// - OrderGenerator    - tops the order population up to capacity
// - OrderCleaner      - sweeps orders older than the max age
// - WorkerCoordinator - spawns both, shuts them down together
//
// Each worker runs its own timer and stops when its cancellation token fires.
//
// ============================================================================

mod coordinator;
mod order_cleaner;
mod order_generator;

pub use coordinator::WorkerCoordinator;
pub use order_cleaner::OrderCleaner;
pub use order_generator::OrderGenerator;
