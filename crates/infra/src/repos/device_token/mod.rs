mod inmemory;
mod postgres;

pub use inmemory::InMemoryDeviceTokenRepo;
pub use postgres::PostgresDeviceTokenRepo;

use crate::repos::shared::repo::DeleteResult;
use daybell_domain::{DeviceToken, ID};

#[async_trait::async_trait]
pub trait IDeviceTokenRepo: Send + Sync {
    /// Registers a token. If the token string already exists it is
    /// transferred to the new owner and device type.
    async fn upsert_by_token(&self, device_token: &DeviceToken) -> anyhow::Result<()>;
    async fn find_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<DeviceToken>>;
    /// Idempotent: deleting an absent token is a no-op, not an error.
    async fn delete_by_token(&self, token: &str) -> anyhow::Result<DeleteResult>;
    async fn delete_by_tokens(&self, tokens: &[String]) -> anyhow::Result<DeleteResult>;
}
