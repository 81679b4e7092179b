use crate::geo::GeoError;
use crate::storage::StorageError;

// ============================================================================
// Order Lifecycle Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to place order: {0}")]
    Placement(#[from] GeoError),
}
