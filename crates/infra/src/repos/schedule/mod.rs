mod inmemory;
mod postgres;

pub use inmemory::InMemoryScheduleRepo;
pub use postgres::PostgresScheduleRepo;

use daybell_domain::{OutboxMessage, Schedule, ID};

#[async_trait::async_trait]
pub trait IScheduleRepo: Send + Sync {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()>;
    /// Persists the schedule and the outbox message atomically: either both
    /// writes commit or neither does. This is what ties the durability of a
    /// domain event to the business transaction that produced it.
    async fn insert_with_outbox(
        &self,
        schedule: &Schedule,
        message: &OutboxMessage,
    ) -> anyhow::Result<()>;
    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()>;
    async fn find(&self, schedule_id: &ID) -> Option<Schedule>;
    /// Non-repeating schedules of the given users with
    /// `appointment_at` in `[start, end)`.
    async fn find_single_occurrence_in_range(
        &self,
        user_ids: &[ID],
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<Schedule>>;
    async fn find_repeating_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<Schedule>>;
    async fn delete(&self, schedule_id: &ID) -> Option<Schedule>;
}
