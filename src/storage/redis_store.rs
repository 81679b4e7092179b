use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use redis::aio::ConnectionManager;
use redis::geo::{Coord, RadiusOptions, RadiusOrder, RadiusSearchResult};
use redis::AsyncCommands;
use std::time::Duration;

use crate::geo::Point;
use crate::models::{Courier, Order};

use super::courier_storage::CourierStorage;
use super::cutoff_timestamp;
use super::errors::{StorageError, StorageResult};
use super::order_storage::OrderStorage;
use super::units::DistanceUnit;

// ============================================================================
// Redis Backend
// ============================================================================
//
// Keys:
// - order:{id}      - JSON order record, expires after max_age
// - order:id        - INCR counter for order IDs
// - orders          - geo set, member = "order:{id}"
// - orders:created  - sorted set, member = "order:{id}", score = created_at (unix secs)
// - courier         - JSON courier record, no expiry
//
// A geo set's score is the member's geohash, so creation time lives in its
// own sorted set and cleanup ranges over that instead.
//
// ============================================================================

const ID_COUNTER_KEY: &str = "order:id";
const GEO_INDEX_KEY: &str = "orders";
const CREATED_INDEX_KEY: &str = "orders:created";
const COURIER_KEY: &str = "courier";

fn order_key(id: i64) -> String {
    format!("order:{}", id)
}

/// Open a multiplexed, auto-reconnecting connection.
pub async fn connect(url: &str) -> redis::RedisResult<ConnectionManager> {
    let client = redis::Client::open(url)?;
    ConnectionManager::new(client).await
}

#[derive(Clone)]
pub struct RedisOrderStorage {
    conn: ConnectionManager,
}

impl RedisOrderStorage {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    async fn get_by_key(&self, key: &str) -> StorageResult<Option<Order>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(key).await?;

        Ok(payload
            .map(|json| serde_json::from_str::<Order>(&json))
            .transpose()?)
    }

    /// Drop every indexed order created strictly before `cutoff` (unix secs).
    pub async fn remove_created_before(&self, cutoff: i64) -> StorageResult<usize> {
        let mut conn = self.conn.clone();
        let stale: Vec<String> = conn
            .zrangebyscore(CREATED_INDEX_KEY, "-inf", format!("({}", cutoff))
            .await?;

        if stale.is_empty() {
            return Ok(0);
        }

        let _: () = redis::pipe()
            .atomic()
            .zrem(GEO_INDEX_KEY, &stale)
            .ignore()
            .zrem(CREATED_INDEX_KEY, &stale)
            .ignore()
            .query_async(&mut conn)
            .await?;

        // Records usually expired on their own already; a miss is not an error
        let deletions = stale.iter().map(|key| {
            let mut conn = self.conn.clone();
            async move {
                let result: redis::RedisResult<i64> = conn.del(key).await;
                (key, result)
            }
        });

        for (key, result) in join_all(deletions).await {
            if let Err(e) = result {
                tracing::warn!(key = %key, error = %e, "Failed to delete data of old order");
            }
        }

        tracing::debug!(removed = stale.len(), cutoff = cutoff, "Removed old orders from indexes");
        Ok(stale.len())
    }
}

#[async_trait]
impl OrderStorage for RedisOrderStorage {
    async fn save(&self, order: &Order, max_age: Duration) -> StorageResult<()> {
        if order.id == 0 {
            return Err(StorageError::UnassignedId);
        }

        let key = order_key(order.id);
        let payload = serde_json::to_string(order)?;
        let ttl_ms = u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX).max(1);

        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .pset_ex(&key, payload, ttl_ms)
            .ignore()
            .geo_add(GEO_INDEX_KEY, (Coord::lon_lat(order.lng, order.lat), &key))
            .ignore()
            .zadd(CREATED_INDEX_KEY, &key, order.created_at.timestamp())
            .ignore()
            .query_async(&mut conn)
            .await?;

        tracing::debug!(order_id = order.id, ttl_ms = ttl_ms, "Saved order");
        Ok(())
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Order>> {
        self.get_by_key(&order_key(id)).await
    }

    async fn generate_unique_id(&self) -> StorageResult<i64> {
        let mut conn = self.conn.clone();
        let id: i64 = conn.incr(ID_COUNTER_KEY, 1).await?;
        Ok(id)
    }

    async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> StorageResult<Vec<Order>> {
        let options = RadiusOptions::default()
            .with_dist()
            .with_coord()
            .order(RadiusOrder::Asc);

        let mut conn = self.conn.clone();
        let matches: Vec<RadiusSearchResult> = conn
            .geo_radius(GEO_INDEX_KEY, center.lng, center.lat, radius, unit.into(), options)
            .await?;

        let mut orders = Vec::with_capacity(matches.len());
        for found in matches {
            match self.get_by_key(&found.name).await {
                Ok(Some(order)) => orders.push(order),
                Ok(None) => {
                    tracing::debug!(key = %found.name, "Indexed order expired before it was resolved");
                }
                Err(e) => {
                    tracing::warn!(key = %found.name, error = %e, "Failed to resolve indexed order");
                }
            }
        }

        Ok(orders)
    }

    async fn get_count(&self) -> StorageResult<usize> {
        let mut conn = self.conn.clone();
        let count: usize = conn.zcard(GEO_INDEX_KEY).await?;
        Ok(count)
    }

    async fn remove_old_orders(&self, max_age: Duration) -> StorageResult<usize> {
        let cutoff = cutoff_timestamp(Utc::now().timestamp(), max_age);
        self.remove_created_before(cutoff).await
    }
}

#[derive(Clone)]
pub struct RedisCourierStorage {
    conn: ConnectionManager,
}

impl RedisCourierStorage {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CourierStorage for RedisCourierStorage {
    async fn save(&self, courier: &Courier) -> StorageResult<()> {
        let payload = serde_json::to_string(courier)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(COURIER_KEY, payload).await?;
        Ok(())
    }

    async fn get_one(&self) -> StorageResult<Option<Courier>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(COURIER_KEY).await?;

        Ok(payload
            .map(|json| serde_json::from_str::<Courier>(&json))
            .transpose()?)
    }
}
