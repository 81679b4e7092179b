use async_trait::async_trait;

use crate::models::Courier;

use super::errors::StorageResult;

/// Persistence of the courier singleton (no expiry).
#[async_trait]
pub trait CourierStorage: Send + Sync {
    async fn save(&self, courier: &Courier) -> StorageResult<()>;

    async fn get_one(&self) -> StorageResult<Option<Courier>>;
}
