mod device_token;
mod outbox;
mod schedule;
mod shared;
mod user;

pub use device_token::IDeviceTokenRepo;
use device_token::{InMemoryDeviceTokenRepo, PostgresDeviceTokenRepo};
use outbox::{InMemoryOutboxRepo, PostgresOutboxRepo};
pub use outbox::IOutboxRepo;
use schedule::{InMemoryScheduleRepo, PostgresScheduleRepo};
pub use schedule::IScheduleRepo;
pub use shared::repo::DeleteResult;
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, Mutex};
use user::{InMemoryUserRepo, PostgresUserRepo};
pub use user::IUserRepo;

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn IUserRepo>,
    pub schedules: Arc<dyn IScheduleRepo>,
    pub device_tokens: Arc<dyn IDeviceTokenRepo>,
    pub outbox: Arc<dyn IOutboxRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        Ok(Self {
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            schedules: Arc::new(PostgresScheduleRepo::new(pool.clone())),
            device_tokens: Arc::new(PostgresDeviceTokenRepo::new(pool.clone())),
            outbox: Arc::new(PostgresOutboxRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        // The schedule repo shares the outbox store so that
        // `insert_with_outbox` is atomic across both collections.
        let outbox_store = Arc::new(Mutex::new(Vec::new()));
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
            schedules: Arc::new(InMemoryScheduleRepo::new(outbox_store.clone())),
            device_tokens: Arc::new(InMemoryDeviceTokenRepo::new()),
            outbox: Arc::new(InMemoryOutboxRepo::new(outbox_store)),
        }
    }
}
