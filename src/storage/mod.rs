// ============================================================================
// Storage Layer
// ============================================================================
//
// Seams to the external key-value / geospatial store:
// - OrderStorage   - TTL-backed order records + geo and creation-time indexes
// - CourierStorage - the courier singleton
//
// Backends:
// - redis  - production backend (SET PX, INCR, GEOADD/GEORADIUS, ZSETs)
// - memory - same semantics in-process, used by tests and local runs
//
// Single-record operations are atomic; multi-record sequences are not and
// callers tolerate the races that follow from that.
//
// ============================================================================

mod courier_storage;
mod errors;
mod memory;
mod order_storage;
mod redis_store;
mod units;

pub use courier_storage::CourierStorage;
pub use errors::{StorageError, StorageResult};
pub use memory::{InMemoryCourierStorage, InMemoryOrderStorage};
pub use order_storage::OrderStorage;
pub use redis_store::{connect, RedisCourierStorage, RedisOrderStorage};
pub use units::DistanceUnit;

use std::time::Duration;

/// Unix-seconds boundary for "older than `max_age`". Entries scored strictly
/// below it are stale.
pub(crate) fn cutoff_timestamp(now: i64, max_age: Duration) -> i64 {
    let age = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    now.saturating_sub(age)
}
