// ============================================================================
// Order Domain - Order lifecycle
// ============================================================================
//
// - Errors (OrderError enum)
// - Service (OrderService: generate / save / query / expire)
//
// ============================================================================

pub mod errors;
pub mod service;

// Re-export for convenience
pub use errors::*;
pub use service::*;
