// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// - order   - order lifecycle (generation, persistence, expiry, radius lookup)
// - courier - courier position, zone correction and movement
// - facade  - status / move operations offered to the transport layer
//
// Services receive the shared ZoneSet and their store at construction and
// never touch the store backends directly.
//
// ============================================================================

pub mod courier;
pub mod facade;
pub mod order;

pub use facade::{CourierFacade, FacadeError};
