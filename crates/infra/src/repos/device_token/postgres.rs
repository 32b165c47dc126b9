use super::IDeviceTokenRepo;
use crate::repos::shared::repo::DeleteResult;
use daybell_domain::{DeviceToken, DeviceType, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresDeviceTokenRepo {
    pool: PgPool,
}

impl PostgresDeviceTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeviceTokenRaw {
    device_token_uid: Uuid,
    user_uid: Uuid,
    token: String,
    device_type: String,
}

impl From<DeviceTokenRaw> for DeviceToken {
    fn from(raw: DeviceTokenRaw) -> Self {
        Self {
            id: raw.device_token_uid.into(),
            user_id: raw.user_uid.into(),
            token: raw.token,
            device_type: raw
                .device_type
                .parse::<DeviceType>()
                .expect("Stored device type to be valid"),
        }
    }
}

#[async_trait::async_trait]
impl IDeviceTokenRepo for PostgresDeviceTokenRepo {
    async fn upsert_by_token(&self, device_token: &DeviceToken) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO device_tokens(device_token_uid, user_uid, token, device_type)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (token) DO UPDATE
            SET user_uid = EXCLUDED.user_uid,
            device_type = EXCLUDED.device_type
            "#,
        )
        .bind(device_token.id.inner_ref())
        .bind(device_token.user_id.inner_ref())
        .bind(&device_token.token)
        .bind(device_token.device_type.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<DeviceToken>> {
        let user_uids = user_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let tokens = sqlx::query_as::<_, DeviceTokenRaw>(
            r#"
            SELECT * FROM device_tokens
            WHERE user_uid = ANY($1)
            "#,
        )
        .bind(&user_uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens.into_iter().map(|t| t.into()).collect())
    }

    async fn delete_by_token(&self, token: &str) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM device_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }

    async fn delete_by_tokens(&self, tokens: &[String]) -> anyhow::Result<DeleteResult> {
        let res = sqlx::query(
            r#"
            DELETE FROM device_tokens
            WHERE token = ANY($1)
            "#,
        )
        .bind(tokens)
        .execute(&self.pool)
        .await?;

        Ok(DeleteResult {
            deleted_count: res.rows_affected() as i64,
        })
    }
}
