mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
pub use postgres::PostgresUserRepo;

use daybell_domain::User;

/// Accounts are owned by another system; this core only needs to seed users
/// and enumerate the ones that opted into the nightly reminder.
#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn find_all_daily_reminder_enabled(&self) -> anyhow::Result<Vec<User>>;
}
