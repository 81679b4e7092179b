use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::geo::Point;
use crate::models::{Courier, Order};

use super::courier_storage::CourierStorage;
use super::cutoff_timestamp;
use super::errors::{StorageError, StorageResult};
use super::order_storage::OrderStorage;
use super::units::DistanceUnit;

// ============================================================================
// In-Memory Backend
// ============================================================================
//
// Mirrors the Redis layout: records expire lazily (checked on read against
// the tokio clock) while index entries stay until the cleanup sweep removes
// them, exactly like a TTL'd key whose geo/zset members outlive it.
//
// ============================================================================

struct StoredOrder {
    order: Order,
    expires_at: Instant,
}

struct IndexEntry {
    location: Point,
    created_ts: i64,
}

#[derive(Default)]
struct OrderState {
    records: HashMap<i64, StoredOrder>,
    index: HashMap<i64, IndexEntry>,
}

impl OrderState {
    fn live_record(&self, id: i64, now: Instant) -> Option<&Order> {
        self.records
            .get(&id)
            .filter(|stored| stored.expires_at > now)
            .map(|stored| &stored.order)
    }
}

#[derive(Default)]
pub struct InMemoryOrderStorage {
    state: RwLock<OrderState>,
    last_id: AtomicI64,
}

impl InMemoryOrderStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every indexed order created strictly before `cutoff` (unix secs).
    pub async fn remove_created_before(&self, cutoff: i64) -> StorageResult<usize> {
        let mut state = self.state.write().await;

        let stale: Vec<i64> = state
            .index
            .iter()
            .filter(|(_, entry)| entry.created_ts < cutoff)
            .map(|(id, _)| *id)
            .collect();

        for id in &stale {
            state.index.remove(id);
            state.records.remove(id);
        }

        Ok(stale.len())
    }
}

#[async_trait]
impl OrderStorage for InMemoryOrderStorage {
    async fn save(&self, order: &Order, max_age: Duration) -> StorageResult<()> {
        if order.id == 0 {
            return Err(StorageError::UnassignedId);
        }

        let mut state = self.state.write().await;
        state.records.insert(
            order.id,
            StoredOrder {
                order: order.clone(),
                expires_at: Instant::now() + max_age,
            },
        );
        state.index.insert(
            order.id,
            IndexEntry {
                location: order.location(),
                created_ts: order.created_at.timestamp(),
            },
        );

        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Order>> {
        let state = self.state.read().await;
        Ok(state.live_record(id, Instant::now()).cloned())
    }

    async fn generate_unique_id(&self) -> StorageResult<i64> {
        Ok(self.last_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> StorageResult<Vec<Order>> {
        let limit_meters = unit.to_meters(radius);
        let now = Instant::now();
        let state = self.state.read().await;

        let mut matches: Vec<(i64, f64)> = state
            .index
            .iter()
            .map(|(id, entry)| (*id, center.distance_meters(entry.location)))
            .filter(|(_, distance)| *distance <= limit_meters)
            .collect();
        matches.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut orders = Vec::with_capacity(matches.len());
        for (id, _) in matches {
            match state.live_record(id, now) {
                Some(order) => orders.push(order.clone()),
                None => {
                    tracing::debug!(order_id = id, "Indexed order expired before it was resolved");
                }
            }
        }

        Ok(orders)
    }

    async fn get_count(&self) -> StorageResult<usize> {
        Ok(self.state.read().await.index.len())
    }

    async fn remove_old_orders(&self, max_age: Duration) -> StorageResult<usize> {
        let cutoff = cutoff_timestamp(Utc::now().timestamp(), max_age);
        self.remove_created_before(cutoff).await
    }
}

#[derive(Default)]
pub struct InMemoryCourierStorage {
    courier: RwLock<Option<Courier>>,
}

impl InMemoryCourierStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourierStorage for InMemoryCourierStorage {
    async fn save(&self, courier: &Courier) -> StorageResult<()> {
        *self.courier.write().await = Some(courier.clone());
        Ok(())
    }

    async fn get_one(&self) -> StorageResult<Option<Courier>> {
        Ok(self.courier.read().await.clone())
    }
}
