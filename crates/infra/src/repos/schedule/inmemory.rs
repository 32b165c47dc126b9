use super::IScheduleRepo;
use crate::repos::shared::inmemory_repo;
use daybell_domain::{OutboxMessage, Schedule, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryScheduleRepo {
    schedules: Mutex<Vec<Schedule>>,
    // Shared with `InMemoryOutboxRepo` so that `insert_with_outbox` can
    // write both collections under locks, mirroring a database transaction.
    outbox: Arc<Mutex<Vec<OutboxMessage>>>,
}

impl InMemoryScheduleRepo {
    pub fn new(outbox: Arc<Mutex<Vec<OutboxMessage>>>) -> Self {
        Self {
            schedules: Mutex::new(Vec::new()),
            outbox,
        }
    }
}

#[async_trait::async_trait]
impl IScheduleRepo for InMemoryScheduleRepo {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()> {
        inmemory_repo::insert(schedule, &self.schedules);
        Ok(())
    }

    async fn insert_with_outbox(
        &self,
        schedule: &Schedule,
        message: &OutboxMessage,
    ) -> anyhow::Result<()> {
        let mut schedules = self.schedules.lock().unwrap();
        // Validate before touching either collection so that a failure
        // leaves no partial write behind, like an aborted transaction.
        if schedules.iter().any(|s| s.id == schedule.id) {
            anyhow::bail!("Schedule with id: {} already exists", schedule.id);
        }
        let mut outbox = self.outbox.lock().unwrap();
        schedules.push(schedule.clone());
        outbox.push(message.clone());
        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        inmemory_repo::save(schedule, &self.schedules);
        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> Option<Schedule> {
        inmemory_repo::find(schedule_id, &self.schedules)
    }

    async fn find_single_occurrence_in_range(
        &self,
        user_ids: &[ID],
        start: i64,
        end: i64,
    ) -> anyhow::Result<Vec<Schedule>> {
        Ok(inmemory_repo::find_by(&self.schedules, |s| {
            !s.is_repeat
                && user_ids.contains(&s.user_id)
                && s.appointment_at
                    .map(|at| at >= start && at < end)
                    .unwrap_or(false)
        }))
    }

    async fn find_repeating_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<Schedule>> {
        Ok(inmemory_repo::find_by(&self.schedules, |s| {
            s.is_repeat && user_ids.contains(&s.user_id)
        }))
    }

    async fn delete(&self, schedule_id: &ID) -> Option<Schedule> {
        let mut schedules = self.schedules.lock().unwrap();
        let pos = schedules.iter().position(|s| &s.id == schedule_id)?;
        Some(schedules.remove(pos))
    }
}
