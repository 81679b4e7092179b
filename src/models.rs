use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::geo::Point;

// ============================================================================
// Domain Models
// ============================================================================

/// A delivery order. `id == 0` means "not yet assigned" and is never stored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Order {
    pub id: i64,
    pub price: f64,
    pub delivery_price: f64,
    pub lng: f64,
    pub lat: f64,
    pub is_delivered: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn location(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

/// The single simulated courier.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Courier {
    pub location: Point,
}

impl Courier {
    pub fn at(location: Point) -> Self {
        Self { location }
    }
}

/// What the transport layer shows: the courier plus the orders it can see.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CourierStatus {
    pub courier: Courier,
    pub orders: Vec<Order>,
}
