use crate::shared::datetime::earliest_instant_at_or_after;
use crate::shared::usecase::UseCase;
use chrono::TimeZone;
use daybell_domain::ID;
use daybell_infra::{DaybellContext, NotificationDispatcher};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{error, info, warn};

const DAILY_REMINDER_TITLE: &str = "내일 일정 알림";

fn reminder_body(count: usize) -> String {
    format!("내일 {}개의 일정이 예정되어 있어요", count)
}

/// Nightly batch: tells every reminder-enabled user how many schedules they
/// have tomorrow. One multicast push per user; a failure for one user never
/// blocks the others.
#[derive(Debug)]
pub struct SendDailyRemindersUseCase;

#[derive(Debug, Default, PartialEq)]
pub struct DailyReminderReport {
    pub users_notified: usize,
    pub users_failed: usize,
    pub tokens_pruned: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for SendDailyRemindersUseCase {
    type Response = DailyReminderReport;

    type Error = UseCaseError;

    const NAME: &'static str = "SendDailyReminders";

    async fn execute(&mut self, ctx: &DaybellContext) -> Result<Self::Response, Self::Error> {
        let users = ctx
            .repos
            .users
            .find_all_daily_reminder_enabled()
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        if users.is_empty() {
            return Ok(Default::default());
        }
        let user_ids = users.iter().map(|u| u.id.clone()).collect::<Vec<_>>();

        let tz = ctx.config.timezone;
        let now = tz.timestamp_millis(ctx.sys.get_timestamp_millis());
        let tomorrow = now.date().succ();
        // Day boundaries survive DST transitions that erase midnight
        let start_of_tomorrow = earliest_instant_at_or_after(tomorrow, 0).timestamp_millis();
        let start_of_next_day =
            earliest_instant_at_or_after(tomorrow.succ(), 0).timestamp_millis();

        let mut applicable = ctx
            .repos
            .schedules
            .find_single_occurrence_in_range(&user_ids, start_of_tomorrow, start_of_next_day)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        let tomorrow_date = tomorrow.naive_local();
        let repeating = ctx
            .repos
            .schedules
            .find_repeating_by_users(&user_ids)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        applicable.extend(
            repeating
                .into_iter()
                .filter(|s| s.is_scheduled_for_date(&tomorrow_date)),
        );

        let mut counts: HashMap<ID, usize> = HashMap::new();
        for schedule in &applicable {
            *counts.entry(schedule.user_id.clone()).or_insert(0) += 1;
        }
        if counts.is_empty() {
            return Ok(Default::default());
        }

        let affected_users = counts.keys().cloned().collect::<Vec<_>>();
        let device_tokens = ctx
            .repos
            .device_tokens
            .find_by_users(&affected_users)
            .await
            .map_err(|_| UseCaseError::StorageError)?;
        let mut tokens_by_user: HashMap<ID, Vec<String>> = HashMap::new();
        for device_token in device_tokens {
            tokens_by_user
                .entry(device_token.user_id)
                .or_insert_with(Vec::new)
                .push(device_token.token);
        }

        let dispatcher = NotificationDispatcher::new(
            ctx.push.clone(),
            ctx.config.push_batch_size,
            Duration::from_millis(ctx.config.external_call_timeout_millis),
        );

        let mut report = DailyReminderReport::default();
        for (user_id, count) in counts {
            let tokens = match tokens_by_user.remove(&user_id) {
                Some(tokens) => tokens,
                // A user without registered devices is not an error
                None => continue,
            };

            let invalid_tokens = match dispatcher
                .send_to_tokens(&tokens, DAILY_REMINDER_TITLE, &reminder_body(count))
                .await
            {
                Ok(invalid_tokens) => invalid_tokens,
                Err(e) => {
                    error!(
                        "Unable to send daily reminder to user: {}: {:?}",
                        user_id, e
                    );
                    report.users_failed += 1;
                    continue;
                }
            };
            report.users_notified += 1;

            if invalid_tokens.is_empty() {
                continue;
            }
            // Best-effort pruning of dead registrations, never blocks the run
            match ctx.repos.device_tokens.delete_by_tokens(&invalid_tokens).await {
                Ok(res) => report.tokens_pruned += res.deleted_count as usize,
                Err(e) => warn!(
                    "Unable to prune invalid device tokens for user: {}: {:?}",
                    user_id, e
                ),
            }
        }

        info!(
            "Daily reminders sent. Users notified: {}, failed: {}, tokens pruned: {}",
            report.users_notified, report.users_failed, report.tokens_pruned
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybell_domain::{
        Alarm, DeviceToken, DeviceType, Schedule, User,
    };
    use daybell_infra::{setup_context_inmemory, IPushGateway, ISys, MulticastReport};
    use std::sync::{Arc, Mutex};

    // Wed Feb 24 2021 12:00:00 KST; tomorrow is Thursday (weekday code 4)
    const WEDNESDAY_NOON_KST: i64 = 1614135600000;

    struct StaticTimeSys(i64);
    impl ISys for StaticTimeSys {
        fn get_timestamp_millis(&self) -> i64 {
            self.0
        }
    }

    #[derive(Debug, Clone)]
    struct SentPush {
        tokens: Vec<String>,
        body: String,
    }

    struct RecordingGateway {
        sent: Mutex<Vec<SentPush>>,
        invalid: Vec<String>,
    }

    impl RecordingGateway {
        fn new(invalid: Vec<String>) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                invalid,
            }
        }
    }

    #[async_trait::async_trait]
    impl IPushGateway for RecordingGateway {
        async fn send_multicast(
            &self,
            tokens: &[String],
            _title: &str,
            body: &str,
        ) -> anyhow::Result<MulticastReport> {
            self.sent.lock().unwrap().push(SentPush {
                tokens: tokens.to_vec(),
                body: body.to_string(),
            });
            let invalid_tokens = tokens
                .iter()
                .filter(|t| self.invalid.contains(t))
                .cloned()
                .collect::<Vec<_>>();
            Ok(MulticastReport {
                success_count: tokens.len() - invalid_tokens.len(),
                failure_count: invalid_tokens.len(),
                invalid_tokens,
            })
        }
    }

    fn setup(gateway: Arc<RecordingGateway>) -> DaybellContext {
        let mut ctx = setup_context_inmemory();
        ctx.sys = Arc::new(StaticTimeSys(WEDNESDAY_NOON_KST));
        ctx.push = gateway;
        ctx
    }

    async fn insert_user(ctx: &DaybellContext, reminder_enabled: bool) -> User {
        let user = if reminder_enabled {
            User::with_daily_reminder()
        } else {
            User::new()
        };
        ctx.repos.users.insert(&user).await.unwrap();
        user
    }

    fn single_schedule(user: &User, appointment_at: i64) -> Schedule {
        Schedule {
            id: Default::default(),
            user_id: user.id.clone(),
            title: "내일 약속".to_string(),
            is_repeat: false,
            repeat_days: Default::default(),
            appointment_at: Some(appointment_at),
            preparation_alarm: Alarm::disabled_at(appointment_at),
            departure_alarm: Alarm::disabled_at(appointment_at),
            departure_place_id: None,
            arrival_place_id: None,
        }
    }

    fn repeating_schedule(user: &User, repeat_days: &str) -> Schedule {
        let mut schedule = single_schedule(user, 0);
        schedule.is_repeat = true;
        schedule.appointment_at = None;
        schedule.repeat_days = repeat_days.parse().unwrap();
        schedule
    }

    fn tomorrow_at_kst(hour: u32) -> i64 {
        // Thursday Feb 25 2021 at the given hour, KST
        WEDNESDAY_NOON_KST - 1000 * 60 * 60 * 12 + 1000 * 60 * 60 * (24 + hour as i64)
    }

    async fn register_token(ctx: &DaybellContext, user: &User, token: &str) {
        ctx.repos
            .device_tokens
            .upsert_by_token(&DeviceToken::new(
                user.id.clone(),
                token.to_string(),
                DeviceType::Android,
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn notifies_each_user_with_their_own_count() {
        let gateway = Arc::new(RecordingGateway::new(vec![]));
        let ctx = setup(gateway.clone());

        // One non-repeating schedule tomorrow
        let single_user = insert_user(&ctx, true).await;
        ctx.repos
            .schedules
            .insert(&single_schedule(&single_user, tomorrow_at_kst(10)))
            .await
            .unwrap();
        register_token(&ctx, &single_user, "token-single").await;

        // One repeating schedule matching tomorrow (Thursday = 4), twice
        let repeat_user = insert_user(&ctx, true).await;
        ctx.repos
            .schedules
            .insert(&repeating_schedule(&repeat_user, "2,4"))
            .await
            .unwrap();
        ctx.repos
            .schedules
            .insert(&repeating_schedule(&repeat_user, "4,6"))
            .await
            .unwrap();
        register_token(&ctx, &repeat_user, "token-repeat").await;

        // No schedules tomorrow: repeating on another weekday and a
        // schedule the day after tomorrow
        let idle_user = insert_user(&ctx, true).await;
        ctx.repos
            .schedules
            .insert(&repeating_schedule(&idle_user, "5"))
            .await
            .unwrap();
        ctx.repos
            .schedules
            .insert(&single_schedule(&idle_user, tomorrow_at_kst(25)))
            .await
            .unwrap();
        register_token(&ctx, &idle_user, "token-idle").await;

        let report = SendDailyRemindersUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.users_notified, 2);

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        let for_single = sent
            .iter()
            .find(|p| p.tokens == vec!["token-single".to_string()])
            .expect("Push for the single-occurrence user");
        assert_eq!(for_single.body, "내일 1개의 일정이 예정되어 있어요");
        let for_repeat = sent
            .iter()
            .find(|p| p.tokens == vec!["token-repeat".to_string()])
            .expect("Push for the repeating user");
        assert_eq!(for_repeat.body, "내일 2개의 일정이 예정되어 있어요");
    }

    #[tokio::test]
    async fn no_enabled_users_means_no_work_at_all() {
        let gateway = Arc::new(RecordingGateway::new(vec![]));
        let ctx = setup(gateway.clone());

        // Reminder preference disabled
        let user = insert_user(&ctx, false).await;
        ctx.repos
            .schedules
            .insert(&single_schedule(&user, tomorrow_at_kst(10)))
            .await
            .unwrap();
        register_token(&ctx, &user, "token-disabled").await;

        let report = SendDailyRemindersUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report, DailyReminderReport::default());
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_without_tokens_are_skipped_silently() {
        let gateway = Arc::new(RecordingGateway::new(vec![]));
        let ctx = setup(gateway.clone());

        let user = insert_user(&ctx, true).await;
        ctx.repos
            .schedules
            .insert(&single_schedule(&user, tomorrow_at_kst(10)))
            .await
            .unwrap();

        let report = SendDailyRemindersUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.users_notified, 0);
        assert_eq!(report.users_failed, 0);
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_tokens_are_pruned_and_valid_ones_kept() {
        let gateway = Arc::new(RecordingGateway::new(vec!["token-dead".to_string()]));
        let ctx = setup(gateway.clone());

        let user = insert_user(&ctx, true).await;
        ctx.repos
            .schedules
            .insert(&single_schedule(&user, tomorrow_at_kst(10)))
            .await
            .unwrap();
        register_token(&ctx, &user, "token-dead").await;
        register_token(&ctx, &user, "token-alive").await;

        let report = SendDailyRemindersUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.users_notified, 1);
        assert_eq!(report.tokens_pruned, 1);

        let remaining = ctx
            .repos
            .device_tokens
            .find_by_users(&[user.id.clone()])
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].token, "token-alive");
    }

    #[tokio::test]
    async fn survives_a_midnight_dst_gap_in_the_configured_timezone() {
        // Sat Sep 4 2021 12:00 in Chile; the next day starts at 01:00
        // because the DST jump erases midnight
        const SATURDAY_NOON_CLT: i64 = 1630771200000;

        let gateway = Arc::new(RecordingGateway::new(vec![]));
        let mut ctx = setup(gateway.clone());
        ctx.config.timezone = chrono_tz::America::Santiago;
        ctx.sys = Arc::new(StaticTimeSys(SATURDAY_NOON_CLT));

        let user = insert_user(&ctx, true).await;
        // 10:00 local on the gap-shortened Sunday
        ctx.repos
            .schedules
            .insert(&single_schedule(
                &user,
                SATURDAY_NOON_CLT + 21 * 60 * 60 * 1000,
            ))
            .await
            .unwrap();
        register_token(&ctx, &user, "token-gap").await;

        let report = SendDailyRemindersUseCase.execute(&ctx).await.unwrap();
        assert_eq!(report.users_notified, 1);
        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "내일 1개의 일정이 예정되어 있어요");
    }
}
