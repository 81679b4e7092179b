use std::sync::Arc;

use crate::geo::{GeoError, Point, ZoneSet};
use crate::metrics::Metrics;
use crate::models::Courier;
use crate::storage::CourierStorage;

use super::direction::{step_degrees, Direction};
use super::errors::CourierError;

// ============================================================================
// Courier Service - Courier position and movement
// ============================================================================
//
// Sole writer of the courier record. Reads are read-modify-write without
// compare-and-set: concurrent moves interleave and the last save wins.
//
// ============================================================================

pub struct CourierService {
    storage: Arc<dyn CourierStorage>,
    zones: Arc<ZoneSet>,
    start: Point,
    metrics: Arc<Metrics>,
}

impl CourierService {
    pub fn new(
        storage: Arc<dyn CourierStorage>,
        zones: Arc<ZoneSet>,
        start: Point,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { storage, zones, start, metrics }
    }

    fn relocation_point(&self) -> Result<Point, GeoError> {
        let mut rng = rand::thread_rng();
        self.zones.sample_admissible_point(&mut rng)
    }

    /// Read the courier, creating it at the start position on first use and
    /// moving it back into the admissible area if it is outside.
    pub async fn get_courier(&self) -> Result<Courier, CourierError> {
        let mut courier = match self.storage.get_one().await? {
            Some(courier) => courier,
            None => {
                let courier = Courier::at(self.start);
                self.storage.save(&courier).await?;
                tracing::info!(lat = self.start.lat, lng = self.start.lng, "Initialized courier");
                courier
            }
        };

        if !self.zones.is_admissible(courier.location) {
            let from = courier.location;
            courier.location = self.relocation_point()?;
            self.storage.save(&courier).await?;
            self.metrics.courier_relocations.inc();

            tracing::info!(
                from_lat = from.lat,
                from_lng = from.lng,
                to_lat = courier.location.lat,
                to_lng = courier.location.lng,
                "Courier outside admissible area, relocated"
            );
        }

        Ok(courier)
    }

    /// Step the courier one zoom-scaled step. A step that leaves the
    /// admissible area is discarded and the courier is relocated instead.
    pub async fn move_courier(
        &self,
        mut courier: Courier,
        direction: Direction,
        zoom: i32,
    ) -> Result<Courier, CourierError> {
        let step = step_degrees(zoom);
        let mut next = courier.location;

        match direction {
            Direction::Up => next.lat += step,
            Direction::Down => next.lat -= step,
            Direction::Left => next.lng -= step,
            Direction::Right => next.lng += step,
        }

        if self.zones.is_admissible(next) {
            courier.location = next;
        } else {
            courier.location = self.relocation_point()?;
            self.metrics.courier_relocations.inc();
            tracing::debug!(direction = %direction, zoom = zoom, "Step left admissible area, relocated");
        }

        self.storage.save(&courier).await?;
        self.metrics.record_courier_move(direction.as_str());

        Ok(courier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Zone;
    use crate::storage::InMemoryCourierStorage;

    const EPS: f64 = 1e-9;

    fn zones() -> Arc<ZoneSet> {
        let allowed = Zone::allowed(vec![
            Point::new(59.0, 30.0),
            Point::new(59.0, 31.0),
            Point::new(60.0, 31.0),
            Point::new(60.0, 30.0),
        ])
        .unwrap();
        let lake = Zone::disallowed(vec![
            Point::new(59.7, 30.7),
            Point::new(59.7, 30.9),
            Point::new(59.9, 30.9),
            Point::new(59.9, 30.7),
        ])
        .unwrap();
        Arc::new(ZoneSet::new(allowed, vec![lake]))
    }

    fn service_with(start: Point) -> (CourierService, Arc<InMemoryCourierStorage>) {
        let storage = Arc::new(InMemoryCourierStorage::new());
        let service = CourierService::new(
            storage.clone(),
            zones(),
            start,
            Arc::new(Metrics::new().unwrap()),
        );
        (service, storage)
    }

    #[tokio::test]
    async fn test_first_read_initializes_at_start() {
        let start = Point::new(59.5, 30.5);
        let (service, storage) = service_with(start);

        let courier = service.get_courier().await.unwrap();
        assert_eq!(courier.location, start);
        assert_eq!(storage.get_one().await.unwrap(), Some(courier));
    }

    #[tokio::test]
    async fn test_inadmissible_start_is_corrected_and_persisted() {
        let (service, storage) = service_with(Point::new(59.9311, 30.3609 + 5.0));

        let courier = service.get_courier().await.unwrap();
        assert!(zones().is_admissible(courier.location));
        assert_eq!(storage.get_one().await.unwrap(), Some(courier));
        assert_eq!(service.metrics.courier_relocations.get(), 1);
    }

    #[tokio::test]
    async fn test_courier_in_disallowed_zone_is_relocated() {
        let (service, storage) = service_with(Point::new(59.5, 30.5));
        storage.save(&Courier::at(Point::new(59.8, 30.8))).await.unwrap();

        let courier = service.get_courier().await.unwrap();
        assert!(zones().is_admissible(courier.location));
    }

    #[tokio::test]
    async fn test_step_size_by_zoom() {
        let start = Point::new(59.5, 30.5);
        let (service, _) = service_with(start);

        for (zoom, expected) in [(14, 0.001), (15, 0.0005), (13, 0.002)] {
            let moved = service
                .move_courier(Courier::at(start), Direction::Up, zoom)
                .await
                .unwrap();
            assert!((moved.location.lat - start.lat - expected).abs() < EPS, "zoom {}", zoom);
            assert_eq!(moved.location.lng, start.lng);
        }
    }

    #[tokio::test]
    async fn test_each_direction_moves_one_axis() {
        let start = Point::new(59.5, 30.5);
        let (service, storage) = service_with(start);

        let down = service.move_courier(Courier::at(start), Direction::Down, 14).await.unwrap();
        assert!((down.location.lat - (start.lat - 0.001)).abs() < EPS);

        let left = service.move_courier(Courier::at(start), Direction::Left, 14).await.unwrap();
        assert!((left.location.lng - (start.lng - 0.001)).abs() < EPS);

        let right = service.move_courier(Courier::at(start), Direction::Right, 14).await.unwrap();
        assert!((right.location.lng - (start.lng + 0.001)).abs() < EPS);
        assert_eq!(storage.get_one().await.unwrap(), Some(right));
    }

    #[tokio::test]
    async fn test_step_out_of_area_relocates_instead_of_clamping() {
        let edge = Point::new(59.9995, 30.5);
        let (service, storage) = service_with(edge);

        let moved = service.move_courier(Courier::at(edge), Direction::Up, 14).await.unwrap();
        assert!(zones().is_admissible(moved.location));
        assert_ne!(moved.location.lat, edge.lat + 0.001);
        assert_eq!(storage.get_one().await.unwrap(), Some(moved));
    }

    #[tokio::test]
    async fn test_step_into_disallowed_zone_relocates() {
        let shore = Point::new(59.6995, 30.8);
        let (service, _) = service_with(shore);

        let moved = service.move_courier(Courier::at(shore), Direction::Up, 14).await.unwrap();
        assert!(zones().is_admissible(moved.location));
    }
}
