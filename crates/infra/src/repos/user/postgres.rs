use super::IUserRepo;
use daybell_domain::User;
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    user_uid: Uuid,
    daily_reminder_enabled: bool,
}

impl From<UserRaw> for User {
    fn from(raw: UserRaw) -> Self {
        Self {
            id: raw.user_uid.into(),
            daily_reminder_enabled: raw.daily_reminder_enabled,
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users(user_uid, daily_reminder_enabled)
            VALUES($1, $2)
            "#,
        )
        .bind(user.id.inner_ref())
        .bind(user.daily_reminder_enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_all_daily_reminder_enabled(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, UserRaw>(
            r#"
            SELECT * FROM users
            WHERE daily_reminder_enabled = TRUE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users.into_iter().map(|user| user.into()).collect())
    }
}
