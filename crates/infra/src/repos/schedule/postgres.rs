use super::IScheduleRepo;
use daybell_domain::{Alarm, OutboxMessage, RepeatDays, Schedule, ID};
use sqlx::{
    types::{Json, Uuid},
    FromRow, PgPool, Postgres, Transaction,
};

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRaw {
    schedule_uid: Uuid,
    user_uid: Uuid,
    title: String,
    is_repeat: bool,
    repeat_days: String,
    appointment_at: Option<i64>,
    preparation_alarm: Json<Alarm>,
    departure_alarm: Json<Alarm>,
    departure_place_uid: Option<Uuid>,
    arrival_place_uid: Option<Uuid>,
}

impl From<ScheduleRaw> for Schedule {
    fn from(raw: ScheduleRaw) -> Self {
        Self {
            id: raw.schedule_uid.into(),
            user_id: raw.user_uid.into(),
            title: raw.title,
            is_repeat: raw.is_repeat,
            repeat_days: raw
                .repeat_days
                .parse::<RepeatDays>()
                .expect("Stored repeat days to be valid"),
            appointment_at: raw.appointment_at,
            preparation_alarm: raw.preparation_alarm.0,
            departure_alarm: raw.departure_alarm.0,
            departure_place_id: raw.departure_place_uid.map(|uid| uid.into()),
            arrival_place_id: raw.arrival_place_uid.map(|uid| uid.into()),
        }
    }
}

async fn insert_schedule(
    tx: &mut Transaction<'_, Postgres>,
    schedule: &Schedule,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO schedules
        (schedule_uid, user_uid, title, is_repeat, repeat_days, appointment_at,
         preparation_alarm, departure_alarm, departure_place_uid, arrival_place_uid)
        VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(schedule.id.inner_ref())
    .bind(schedule.user_id.inner_ref())
    .bind(&schedule.title)
    .bind(schedule.is_repeat)
    .bind(schedule.repeat_days.to_string())
    .bind(schedule.appointment_at)
    .bind(Json(&schedule.preparation_alarm))
    .bind(Json(&schedule.departure_alarm))
    .bind(schedule.departure_place_id.as_ref().map(|id| *id.inner_ref()))
    .bind(schedule.arrival_place_id.as_ref().map(|id| *id.inner_ref()))
    .execute(tx)
    .await?;

    Ok(())
}

#[async_trait::async_trait]
impl IScheduleRepo for PostgresScheduleRepo {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_schedule(&mut tx, schedule).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn insert_with_outbox(
        &self,
        schedule: &Schedule,
        message: &OutboxMessage,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        insert_schedule(&mut tx, schedule).await?;
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
        .execute(&mut tx)
        .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE schedules
            SET title = $2,
            is_repeat = $3,
            repeat_days = $4,
            appointment_at = $5,
            preparation_alarm = $6,
            departure_alarm = $7,
            departure_place_uid = $8,
            arrival_place_uid = $9
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule.id.inner_ref())
        .bind(&schedule.title)
        .bind(schedule.is_repeat)
        .bind(schedule.repeat_days.to_string())
        .bind(schedule.appointment_at)
        .bind(Json(&schedule.preparation_alarm))
        .bind(Json(&schedule.departure_alarm))
        .bind(schedule.departure_place_id.as_ref().map(|id| *id.inner_ref()))
        .bind(schedule.arrival_place_id.as_ref().map(|id| *id.inner_ref()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> Option<Schedule> {
        sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM schedules
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|schedule| schedule.into())
    }

    async fn find_single_occurrence_in_range(
        &self,
        user_ids: &[ID],
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<Schedule>> {
        let user_uids = user_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let schedules = sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM schedules
            WHERE is_repeat = FALSE
            AND user_uid = ANY($1)
            AND appointment_at >= $2
            AND appointment_at < $3
            "#,
        )
        .bind(&user_uids)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules.into_iter().map(|s| s.into()).collect())
    }

    async fn find_repeating_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<Schedule>> {
        let user_uids = user_ids.iter().map(|id| *id.inner_ref()).collect::<Vec<_>>();
        let schedules = sqlx::query_as::<_, ScheduleRaw>(
            r#"
            SELECT * FROM schedules
            WHERE is_repeat = TRUE
            AND user_uid = ANY($1)
            "#,
        )
        .bind(&user_uids)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules.into_iter().map(|s| s.into()).collect())
    }

    async fn delete(&self, schedule_id: &ID) -> Option<Schedule> {
        sqlx::query_as::<_, ScheduleRaw>(
            r#"
            DELETE FROM schedules
            WHERE schedule_uid = $1
            RETURNING *
            "#,
        )
        .bind(schedule_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|schedule| schedule.into())
    }
}
