use std::sync::Arc;

use crate::config::CourierConfig;
use crate::models::CourierStatus;

use super::courier::{CourierError, CourierService, Direction};
use super::order::{OrderError, OrderService};

// ============================================================================
// Courier Facade - Operations exposed to the transport layer
// ============================================================================
//
// Status (courier + visible orders) and move commands. Both are safe to call
// concurrently; store errors surface to the caller.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum FacadeError {
    #[error(transparent)]
    Courier(#[from] CourierError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

#[derive(Clone)]
pub struct CourierFacade {
    couriers: Arc<CourierService>,
    orders: Arc<OrderService>,
    config: CourierConfig,
}

impl CourierFacade {
    pub fn new(couriers: Arc<CourierService>, orders: Arc<OrderService>, config: CourierConfig) -> Self {
        Self { couriers, orders, config }
    }

    pub async fn get_status(&self) -> Result<CourierStatus, FacadeError> {
        let courier = self.couriers.get_courier().await?;
        let orders = self
            .orders
            .get_by_radius(courier.location, self.config.visibility_radius, self.config.visibility_unit)
            .await?;

        Ok(CourierStatus { courier, orders })
    }

    /// Apply a move command. The direction is validated before anything is
    /// read or written.
    pub async fn move_courier(&self, direction: &str, zoom: i32) -> Result<CourierStatus, FacadeError> {
        let direction: Direction = direction.parse()?;

        let courier = self.couriers.get_courier().await?;
        self.couriers.move_courier(courier, direction, zoom).await?;

        self.get_status().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrderConfig;
    use crate::geo::{Point, Zone, ZoneSet};
    use crate::metrics::Metrics;
    use crate::models::{Courier, Order};
    use crate::storage::{CourierStorage, DistanceUnit, InMemoryCourierStorage, InMemoryOrderStorage, OrderStorage};
    use chrono::Utc;
    use std::time::Duration;

    struct Fixture {
        facade: CourierFacade,
        couriers: Arc<InMemoryCourierStorage>,
        orders: Arc<InMemoryOrderStorage>,
    }

    const START: Point = Point { lat: 59.5, lng: 30.5 };

    fn fixture() -> Fixture {
        let zones = Arc::new(ZoneSet::new(
            Zone::allowed(vec![
                Point::new(59.0, 30.0),
                Point::new(59.0, 31.0),
                Point::new(60.0, 31.0),
                Point::new(60.0, 30.0),
            ])
            .unwrap(),
            vec![],
        ));
        let couriers = Arc::new(InMemoryCourierStorage::new());
        let orders = Arc::new(InMemoryOrderStorage::new());
        let metrics = Arc::new(Metrics::new().unwrap());

        let courier_service = Arc::new(CourierService::new(couriers.clone(), zones.clone(), START, metrics));
        let order_service = Arc::new(OrderService::new(orders.clone(), zones, OrderConfig::default()));
        let config = CourierConfig {
            start: START,
            visibility_radius: 2.8,
            visibility_unit: DistanceUnit::Kilometers,
        };

        Fixture {
            facade: CourierFacade::new(courier_service, order_service, config),
            couriers,
            orders,
        }
    }

    fn order_at(id: i64, lat: f64, lng: f64) -> Order {
        Order {
            id,
            price: 2000.0,
            delivery_price: 300.0,
            lng,
            lat,
            is_delivered: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_status_lists_only_visible_orders() {
        let fx = fixture();
        let ttl = Duration::from_secs(120);
        fx.orders.save(&order_at(1, 59.51, 30.5), ttl).await.unwrap();
        fx.orders.save(&order_at(2, 59.7, 30.5), ttl).await.unwrap();

        let status = fx.facade.get_status().await.unwrap();
        assert_eq!(status.courier.location, START);
        assert_eq!(status.orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_move_updates_stored_position() {
        let fx = fixture();

        let status = fx.facade.move_courier("up", 14).await.unwrap();
        assert!((status.courier.location.lat - (START.lat + 0.001)).abs() < 1e-9);
        assert_eq!(fx.couriers.get_one().await.unwrap(), Some(status.courier));
    }

    #[tokio::test]
    async fn test_invalid_direction_leaves_courier_untouched() {
        let fx = fixture();
        let parked = Courier::at(Point::new(59.25, 30.25));
        fx.couriers.save(&parked).await.unwrap();

        let err = fx.facade.move_courier("diagonal", 14).await.unwrap_err();
        assert!(matches!(err, FacadeError::Courier(CourierError::InvalidDirection(_))));
        assert_eq!(fx.couriers.get_one().await.unwrap(), Some(parked));
    }

    #[tokio::test]
    async fn test_extreme_zoom_keeps_courier_admissible() {
        let fx = fixture();

        // Zoomed all the way in: zero-length step, courier stays put
        let still = fx.facade.move_courier("right", i32::MAX).await.unwrap();
        assert_eq!(still.courier.location, START);

        // Zoomed all the way out: the step leaves the area, courier is relocated
        let moved = fx.facade.move_courier("up", i32::MIN).await.unwrap();
        let location = moved.courier.location;
        assert!(location.is_finite());
        assert!((59.0..=60.0).contains(&location.lat));
        assert!((30.0..=31.0).contains(&location.lng));
        assert_eq!(fx.couriers.get_one().await.unwrap(), Some(moved.courier));
    }

    #[tokio::test]
    async fn test_concurrent_moves_settle_on_a_valid_position() {
        let fx = fixture();
        let facade = fx.facade.clone();

        let handles: Vec<_> = ["up", "right", "down", "left", "up", "right"]
            .into_iter()
            .map(|direction| {
                let facade = facade.clone();
                tokio::spawn(async move { facade.move_courier(direction, 14).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Last write wins; whatever survived is a single admissible step sequence
        let stored = fx.couriers.get_one().await.unwrap().unwrap();
        assert!((stored.location.lat - START.lat).abs() <= 0.002 + 1e-9);
        assert!((stored.location.lng - START.lng).abs() <= 0.002 + 1e-9);
    }
}
