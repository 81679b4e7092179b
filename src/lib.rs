// ============================================================================
// Geofenced Courier Simulator
// ============================================================================
//
// - geo      - points, polygon zones and the admissibility policy
// - storage  - order/courier store seams with Redis and in-memory backends
// - domain   - order lifecycle, courier movement and the CourierFacade that a
//              transport layer (HTTP, WebSocket) drives
// - workers  - order generation and cleanup loops plus their coordinator
// - metrics  - Prometheus registry and scrape server
// - config   - env-driven settings and zone loading
//
// The `geo_courier` binary wires these together; transports embed the
// library and call `CourierFacade` directly.
//
// ============================================================================

pub mod config;
pub mod domain;
pub mod geo;
pub mod metrics;
pub mod models;
pub mod storage;
pub mod utils;
pub mod workers;
