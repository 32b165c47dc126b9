mod inmemory;
mod postgres;

pub use inmemory::InMemoryOutboxRepo;
pub use postgres::PostgresOutboxRepo;

use daybell_domain::{OutboxMessage, OutboxStatus, ID};

#[async_trait::async_trait]
pub trait IOutboxRepo: Send + Sync {
    async fn insert(&self, message: &OutboxMessage) -> anyhow::Result<()>;
    /// Atomically claims up to `limit` PENDING rows by moving them to
    /// IN_PROGRESS and returns them in creation order. Two concurrent
    /// dispatcher runs can never claim the same row.
    async fn claim_pending(&self, limit: i64) -> anyhow::Result<Vec<OutboxMessage>>;
    async fn mark_dispatched(&self, message_id: &ID) -> anyhow::Result<()>;
    async fn mark_failed(&self, message_id: &ID) -> anyhow::Result<()>;
    /// Returns a claimed row to PENDING so a later run retries it.
    async fn release(&self, message_id: &ID) -> anyhow::Result<()>;
    async fn find_by_status(&self, status: OutboxStatus) -> anyhow::Result<Vec<OutboxMessage>>;
}
