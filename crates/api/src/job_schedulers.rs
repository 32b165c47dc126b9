use crate::outbox::DispatchOutboxUseCase;
use crate::reminder::SendDailyRemindersUseCase;
use crate::shared::datetime::earliest_instant_at_or_after;
use crate::shared::usecase::{execute, UseCase};
use chrono::TimeZone;
use chrono_tz::Tz;
use daybell_infra::DaybellContext;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::{interval, sleep};
use tracing::error;

/// Millis from `now_millis` until the next wall-clock occurrence of
/// `hour:00:00` in `tz`, skipping over local times a DST transition erased.
/// Never zero: when invoked exactly at the target hour it returns a full day,
/// which keeps the reminder loop from double firing.
pub fn millis_until_next_local_hour(now_millis: i64, hour: u32, tz: Tz) -> i64 {
    let now = tz.timestamp_millis(now_millis);
    let mut next_run = earliest_instant_at_or_after(now.date(), hour);
    if next_run.timestamp_millis() <= now_millis {
        next_run = earliest_instant_at_or_after(now.date().succ(), hour);
    }
    next_run.timestamp_millis() - now_millis
}

/// Runs one use case on its own task so a panicking run is contained there
/// instead of unwinding the job loop that scheduled it.
async fn run_and_isolate<U>(usecase: U, ctx: &DaybellContext)
where
    U: UseCase + 'static,
    U::Error: Debug + Send,
{
    let ctx = ctx.clone();
    let run = tokio::spawn(async move {
        // Sideeffect, ignore result
        let _ = execute(usecase, &ctx).await;
    });
    if let Err(e) = run.await {
        error!("Background job run panicked: {:?}", e);
    }
}

/// Fires the daily reminder batch once per day at the configured local hour.
/// Runs are strictly sequential: the next delay is computed only after the
/// previous batch finished.
pub fn start_daily_reminder_job(ctx: DaybellContext) {
    tokio::spawn(async move {
        loop {
            let delay = millis_until_next_local_hour(
                ctx.sys.get_timestamp_millis(),
                ctx.config.daily_reminder_hour,
                ctx.config.timezone,
            );
            sleep(Duration::from_millis(delay as u64)).await;
            run_and_isolate(SendDailyRemindersUseCase, &ctx).await;
        }
    });
}

/// Polling lane of the transactional outbox. The post-commit hook already
/// dispatches eagerly, this loop picks up rows that hook missed because the
/// process crashed or the handler was released for retry.
pub fn start_outbox_dispatch_job(ctx: DaybellContext) {
    tokio::spawn(async move {
        let mut poll_interval =
            interval(Duration::from_secs(ctx.config.outbox_poll_interval_secs));
        loop {
            poll_interval.tick().await;
            run_and_isolate(DispatchOutboxUseCase::default(), &ctx).await;
        }
    });
}
