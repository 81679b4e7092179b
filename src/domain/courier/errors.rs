use crate::geo::GeoError;
use crate::storage::StorageError;

// ============================================================================
// Courier Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CourierError {
    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to relocate courier: {0}")]
    Relocation(#[from] GeoError),
}
