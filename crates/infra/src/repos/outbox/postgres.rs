use super::IOutboxRepo;
use daybell_domain::{OutboxMessage, OutboxStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresOutboxRepo {
    pool: PgPool,
}

impl PostgresOutboxRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_status(
        &self,
        message_id: &ID,
        from: OutboxStatus,
        to: OutboxStatus,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE outbox_messages
            SET status = $3
            WHERE outbox_uid = $1
            AND status = $2
            "#,
        )
        .bind(message_id.inner_ref())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct OutboxMessageRaw {
    outbox_uid: Uuid,
    event_type: String,
    payload: String,
    status: String,
    created_at: i64,
}

impl From<OutboxMessageRaw> for OutboxMessage {
    fn from(raw: OutboxMessageRaw) -> Self {
        Self {
            id: raw.outbox_uid.into(),
            event_type: raw.event_type,
            payload: raw.payload,
            status: raw
                .status
                .parse::<OutboxStatus>()
                .expect("Stored outbox status to be valid"),
            created_at: raw.created_at,
        }
    }
}

#[async_trait::async_trait]
impl IOutboxRepo for PostgresOutboxRepo {
    async fn insert(&self, message: &OutboxMessage) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO outbox_messages
            (outbox_uid, event_type, payload, status, created_at)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id.inner_ref())
        .bind(&message.event_type)
        .bind(&message.payload)
        .bind(message.status.as_str())
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn claim_pending(&self, limit: i64) -> anyhow::Result<Vec<OutboxMessage>> {
        // The sub-select with FOR UPDATE SKIP LOCKED makes the claim a single
        // atomic compare-and-swap; a concurrent run skips the locked rows.
        let mut claimed = sqlx::query_as::<_, OutboxMessageRaw>(
            r#"
            UPDATE outbox_messages
            SET status = 'IN_PROGRESS'
            WHERE outbox_uid IN (
                SELECT outbox_uid FROM outbox_messages
                WHERE status = 'PENDING'
                ORDER BY created_at
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|m| m.into())
        .collect::<Vec<OutboxMessage>>();

        // RETURNING gives no ordering guarantee
        claimed.sort_by_key(|m| m.created_at);
        Ok(claimed)
    }

    async fn mark_dispatched(&self, message_id: &ID) -> anyhow::Result<()> {
        self.set_status(message_id, OutboxStatus::InProgress, OutboxStatus::Dispatched)
            .await
    }

    async fn mark_failed(&self, message_id: &ID) -> anyhow::Result<()> {
        self.set_status(message_id, OutboxStatus::InProgress, OutboxStatus::Failed)
            .await
    }

    async fn release(&self, message_id: &ID) -> anyhow::Result<()> {
        self.set_status(message_id, OutboxStatus::InProgress, OutboxStatus::Pending)
            .await
    }

    async fn find_by_status(&self, status: OutboxStatus) -> anyhow::Result<Vec<OutboxMessage>> {
        let messages = sqlx::query_as::<_, OutboxMessageRaw>(
            r#"
            SELECT * FROM outbox_messages
            WHERE status = $1
            ORDER BY created_at
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(messages.into_iter().map(|m| m.into()).collect())
    }
}
