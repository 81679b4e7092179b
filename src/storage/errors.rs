// ============================================================================
// Storage Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order ID is zero")]
    UnassignedId,
}

pub type StorageResult<T> = Result<T, StorageError>;
