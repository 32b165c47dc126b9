use super::subscribers::DispatchOutboxOnQuickScheduleCreated;
use crate::shared::usecase::{Subscriber, UseCase};
use daybell_domain::{Alarm, OutboxMessage, QuickScheduleRequested, Schedule, ID};
use daybell_infra::DaybellContext;

/// Creates a schedule from just a title, two places and an appointment
/// instant. The travel-duration lookup that finalizes the alarm instants is
/// too slow and too unreliable to run inside this transaction, so the use
/// case records a `QuickScheduleRequested` outbox event in the same atomic
/// write as the schedule and lets the outbox dispatcher finish the job after
/// commit.
#[derive(Debug)]
pub struct CreateQuickScheduleUseCase {
    pub user_id: ID,
    pub title: String,
    pub departure_place_id: ID,
    pub arrival_place_id: ID,
    pub appointment_at: i64,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    /// The event could not be serialized; the whole use case aborts so the
    /// event is never silently dropped.
    SerializationError(String),
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for CreateQuickScheduleUseCase {
    type Response = Schedule;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateQuickSchedule";

    async fn execute(&mut self, ctx: &DaybellContext) -> Result<Self::Response, Self::Error> {
        // Both alarms stay disabled until the outbox handler has computed
        // the real trigger instants from the route duration.
        let schedule = Schedule {
            id: Default::default(),
            user_id: self.user_id.clone(),
            title: self.title.clone(),
            is_repeat: false,
            repeat_days: Default::default(),
            appointment_at: Some(self.appointment_at),
            preparation_alarm: Alarm::disabled_at(self.appointment_at),
            departure_alarm: Alarm::disabled_at(self.appointment_at),
            departure_place_id: Some(self.departure_place_id.clone()),
            arrival_place_id: Some(self.arrival_place_id.clone()),
        };

        let event = QuickScheduleRequested {
            schedule_id: schedule.id.clone(),
            user_id: self.user_id.clone(),
            departure_place_id: self.departure_place_id.clone(),
            arrival_place_id: self.arrival_place_id.clone(),
            appointment_at: self.appointment_at,
        };
        let payload = serde_json::to_string(&event)
            .map_err(|e| UseCaseError::SerializationError(e.to_string()))?;
        let message = OutboxMessage::new(
            QuickScheduleRequested::EVENT_TYPE,
            payload,
            ctx.sys.get_timestamp_millis(),
        );

        ctx.repos
            .schedules
            .insert_with_outbox(&schedule, &message)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(schedule)
    }

    fn subscribers() -> Vec<Box<dyn Subscriber<Self>>> {
        vec![Box::new(DispatchOutboxOnQuickScheduleCreated)]
    }
}
