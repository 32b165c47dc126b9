use super::OutboxHandler;
use daybell_domain::QuickScheduleRequested;
use daybell_infra::DaybellContext;
use tracing::info;

/// Consumes `QuickScheduleRequested`: looks up the travel duration between
/// the departure and arrival places and derives the schedule's two alarm
/// instants from it. Re-delivery recomputes the same values, so duplicate
/// invocations are harmless.
pub struct FinalizeQuickScheduleHandler;

#[async_trait::async_trait]
impl OutboxHandler for FinalizeQuickScheduleHandler {
    fn event_type(&self) -> &'static str {
        QuickScheduleRequested::EVENT_TYPE
    }

    async fn handle(&self, payload: &str, ctx: &DaybellContext) -> anyhow::Result<()> {
        let event = serde_json::from_str::<QuickScheduleRequested>(payload)?;

        let mut schedule = match ctx.repos.schedules.find(&event.schedule_id).await {
            Some(schedule) => schedule,
            None => {
                // Deleted since the event was recorded, nothing to finalize
                info!(
                    "Schedule: {} no longer exists, skipping alarm finalization",
                    event.schedule_id
                );
                return Ok(());
            }
        };

        let travel_duration = ctx
            .routes
            .estimate_duration_millis(&event.departure_place_id, &event.arrival_place_id)
            .await?;

        let departure_at = event.appointment_at - travel_duration;
        schedule.departure_alarm.triggered_at = departure_at;
        schedule.departure_alarm.is_enabled = true;
        schedule.preparation_alarm.triggered_at =
            departure_at - ctx.config.preparation_buffer_millis;
        schedule.preparation_alarm.is_enabled = true;

        ctx.repos.schedules.save(&schedule).await?;

        Ok(())
    }
}
