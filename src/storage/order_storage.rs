use async_trait::async_trait;
use std::time::Duration;

use crate::geo::Point;
use crate::models::Order;

use super::errors::StorageResult;
use super::units::DistanceUnit;

/// Geo-indexed, TTL-backed persistence of orders.
#[async_trait]
pub trait OrderStorage: Send + Sync {
    /// Store the order for `max_age` and index it by location and by
    /// `created_at`. Overwrites any prior record with the same ID.
    async fn save(&self, order: &Order, max_age: Duration) -> StorageResult<()>;

    /// `None` when the record is absent or has expired.
    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Order>>;

    async fn generate_unique_id(&self) -> StorageResult<i64>;

    /// Orders indexed within `radius` of `center`. Index entries whose record
    /// expired before it could be resolved are skipped.
    async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> StorageResult<Vec<Order>>;

    /// Cardinality of the geospatial index.
    async fn get_count(&self) -> StorageResult<usize>;

    /// Drop every indexed order created more than `max_age` ago and return how
    /// many index entries were removed. Per-record delete failures are logged.
    async fn remove_old_orders(&self, max_age: Duration) -> StorageResult<usize>;
}
