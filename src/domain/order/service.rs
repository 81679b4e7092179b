use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;

use crate::config::OrderConfig;
use crate::geo::{GeoError, Point, ZoneSet};
use crate::models::Order;
use crate::storage::{DistanceUnit, OrderStorage};

use super::errors::OrderError;

// ============================================================================
// Order Service - Order lifecycle
// ============================================================================
//
// Sole writer of orders. Generates priced orders at admissible points,
// persists them with the configured max age as TTL, and sweeps out the ones
// older than that.
//
// ============================================================================

pub struct OrderService {
    storage: Arc<dyn OrderStorage>,
    zones: Arc<ZoneSet>,
    config: OrderConfig,
}

impl OrderService {
    pub fn new(storage: Arc<dyn OrderStorage>, zones: Arc<ZoneSet>, config: OrderConfig) -> Self {
        Self { storage, zones, config }
    }

    pub fn max_age(&self) -> Duration {
        self.config.max_age()
    }

    /// Location, price and delivery price for a new order.
    fn draw_listing(&self) -> Result<(Point, f64, f64), GeoError> {
        let mut rng = rand::thread_rng();
        let location = self.zones.sample_admissible_point(&mut rng)?;
        let price = rng.gen_range(self.config.min_price..=self.config.max_price);
        let delivery_price =
            rng.gen_range(self.config.min_delivery_price..=self.config.max_delivery_price);

        Ok((location, price, delivery_price))
    }

    pub async fn generate_order(&self) -> Result<Order, OrderError> {
        let id = self.storage.generate_unique_id().await?;
        let (location, price, delivery_price) = self.draw_listing()?;

        let order = Order {
            id,
            price,
            delivery_price,
            lng: location.lng,
            lat: location.lat,
            is_delivered: false,
            created_at: Utc::now(),
        };

        self.storage.save(&order, self.max_age()).await?;

        tracing::debug!(
            order_id = order.id,
            lat = order.lat,
            lng = order.lng,
            price = order.price,
            "Generated order"
        );

        Ok(order)
    }

    /// Persist `order` as created now, replacing any record with its ID.
    pub async fn save(&self, mut order: Order) -> Result<Order, OrderError> {
        order.created_at = Utc::now();
        self.storage.save(&order, self.max_age()).await?;
        Ok(order)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Order>, OrderError> {
        Ok(self.storage.get_by_id(id).await?)
    }

    pub async fn get_by_radius(
        &self,
        center: Point,
        radius: f64,
        unit: DistanceUnit,
    ) -> Result<Vec<Order>, OrderError> {
        Ok(self.storage.get_by_radius(center, radius, unit).await?)
    }

    pub async fn get_count(&self) -> Result<usize, OrderError> {
        Ok(self.storage.get_count().await?)
    }

    pub async fn remove_old_orders(&self) -> Result<usize, OrderError> {
        Ok(self.storage.remove_old_orders(self.max_age()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Zone;
    use crate::storage::{InMemoryOrderStorage, StorageError};

    fn square_zones() -> Arc<ZoneSet> {
        let allowed = Zone::allowed(vec![
            Point::new(59.80, 30.30),
            Point::new(59.80, 30.40),
            Point::new(59.90, 30.40),
            Point::new(59.90, 30.30),
        ])
        .unwrap();
        let hole = Zone::disallowed(vec![
            Point::new(59.84, 30.34),
            Point::new(59.84, 30.36),
            Point::new(59.86, 30.36),
            Point::new(59.86, 30.34),
        ])
        .unwrap();
        Arc::new(ZoneSet::new(allowed, vec![hole]))
    }

    fn service() -> (OrderService, Arc<InMemoryOrderStorage>) {
        let storage = Arc::new(InMemoryOrderStorage::new());
        let service = OrderService::new(storage.clone(), square_zones(), OrderConfig::default());
        (service, storage)
    }

    #[tokio::test]
    async fn test_generated_ids_strictly_increase() {
        let (service, _) = service();
        let mut last = 0;

        for _ in 0..20 {
            let order = service.generate_order().await.unwrap();
            assert!(order.id > last);
            last = order.id;
        }
        assert_eq!(service.get_count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_generated_order_fields_within_bounds() {
        let (service, _) = service();
        let zones = square_zones();

        for _ in 0..100 {
            let order = service.generate_order().await.unwrap();
            assert!((1000.0..=3000.0).contains(&order.price));
            assert!((100.0..=500.0).contains(&order.delivery_price));
            assert!(zones.is_admissible(order.location()));
            assert!(!order.is_delivered);
        }
    }

    #[tokio::test]
    async fn test_generated_order_is_retrievable() {
        let (service, _) = service();
        let order = service.generate_order().await.unwrap();

        assert_eq!(service.get_by_id(order.id).await.unwrap(), Some(order.clone()));

        let nearby = service
            .get_by_radius(order.location(), 10.0, DistanceUnit::Meters)
            .await
            .unwrap();
        assert_eq!(nearby, vec![order]);
    }

    #[tokio::test]
    async fn test_generation_fails_without_admissible_area() {
        let allowed = Zone::allowed(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ])
        .unwrap();
        let everything = Zone::disallowed(vec![
            Point::new(-5.0, -5.0),
            Point::new(-5.0, 5.0),
            Point::new(5.0, 5.0),
            Point::new(5.0, -5.0),
        ])
        .unwrap();
        let service = OrderService::new(
            Arc::new(InMemoryOrderStorage::new()),
            Arc::new(ZoneSet::new(allowed, vec![everything])),
            OrderConfig::default(),
        );

        let err = service.generate_order().await.unwrap_err();
        assert!(matches!(err, OrderError::Placement(GeoError::NoAdmissibleArea { .. })));
        assert_eq!(service.get_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_stamps_creation_time() {
        let (service, _) = service();
        let stale = Order {
            id: 99,
            price: 1200.0,
            delivery_price: 150.0,
            lng: 30.32,
            lat: 59.82,
            is_delivered: false,
            created_at: Utc::now() - chrono::Duration::hours(1),
        };

        let before = Utc::now();
        let saved = service.save(stale).await.unwrap();
        assert!(saved.created_at >= before);

        // Freshly stamped, so the sweep leaves it alone
        assert_eq!(service.remove_old_orders().await.unwrap(), 0);
        assert_eq!(service.get_by_id(99).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_save_rejects_unassigned_id() {
        let (service, _) = service();
        let order = Order {
            id: 0,
            price: 1200.0,
            delivery_price: 150.0,
            lng: 30.32,
            lat: 59.82,
            is_delivered: false,
            created_at: Utc::now(),
        };

        let err = service.save(order).await.unwrap_err();
        assert!(matches!(err, OrderError::Storage(StorageError::UnassignedId)));
    }

    #[tokio::test]
    async fn test_remove_old_orders_drops_only_stale() {
        let (service, storage) = service();
        let fresh = service.generate_order().await.unwrap();

        let mut old = fresh.clone();
        old.id = 1_000;
        old.created_at = Utc::now() - chrono::Duration::minutes(5);
        storage.save(&old, Duration::from_secs(3600)).await.unwrap();

        assert_eq!(service.remove_old_orders().await.unwrap(), 1);
        assert_eq!(service.get_by_id(old.id).await.unwrap(), None);
        assert_eq!(service.get_by_id(fresh.id).await.unwrap(), Some(fresh.clone()));

        let nearby = service
            .get_by_radius(fresh.location(), 10.0, DistanceUnit::Meters)
            .await
            .unwrap();
        assert_eq!(nearby, vec![fresh]);

        // Second sweep with nothing new is a no-op
        assert_eq!(service.remove_old_orders().await.unwrap(), 0);
        assert_eq!(service.get_count().await.unwrap(), 1);
    }
}
