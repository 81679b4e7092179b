// ============================================================================
// Courier Domain - Courier position and movement
// ============================================================================
//
// - Direction (move commands and zoom-scaled step size)
// - Errors (CourierError enum)
// - Service (CourierService: lazy init, zone correction, movement)
//
// ============================================================================

pub mod direction;
pub mod errors;
pub mod service;

// Re-export for convenience
pub use direction::*;
pub use errors::*;
pub use service::*;
