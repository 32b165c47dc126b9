use chrono_tz::Tz;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Fixed calendar/timezone the application runs in. Daily reminders and
    /// weekday computation both use this zone.
    pub timezone: Tz,
    /// Local wall-clock hour at which the daily reminder batch fires.
    pub daily_reminder_hour: u32,
    /// Maximum number of tokens per multicast call to the push transport.
    pub push_batch_size: usize,
    /// Upper bound for any single external call (push send, outbox handler).
    pub external_call_timeout_millis: u64,
    /// How long before the departure alarm the preparation alarm fires.
    pub preparation_buffer_millis: i64,
    /// Cadence of the outbox polling job that re-drives pending rows.
    pub outbox_poll_interval_secs: u64,
}

const DEFAULT_TIMEZONE: &str = "Asia/Seoul";
const DEFAULT_DAILY_REMINDER_HOUR: u32 = 22;
const DEFAULT_PUSH_BATCH_SIZE: usize = 500;
const DEFAULT_EXTERNAL_CALL_TIMEOUT_MILLIS: u64 = 10 * 1000;
const DEFAULT_PREPARATION_BUFFER_MILLIS: i64 = 1000 * 60 * 30;
const DEFAULT_OUTBOX_POLL_INTERVAL_SECS: u64 = 30;

impl Config {
    pub fn new() -> Self {
        let timezone = match std::env::var("TIMEZONE") {
            Ok(tz) => match tz.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given TIMEZONE: {} is not valid, falling back to the default: {}.",
                        tz, DEFAULT_TIMEZONE
                    );
                    DEFAULT_TIMEZONE.parse().unwrap()
                }
            },
            Err(_) => DEFAULT_TIMEZONE.parse().unwrap(),
        };

        let daily_reminder_hour = match std::env::var("DAILY_REMINDER_HOUR") {
            Ok(hour) => match hour.parse::<u32>() {
                Ok(hour) if hour <= 23 => hour,
                _ => {
                    warn!(
                        "The given DAILY_REMINDER_HOUR: {} is not valid, falling back to the default: {}.",
                        hour, DEFAULT_DAILY_REMINDER_HOUR
                    );
                    DEFAULT_DAILY_REMINDER_HOUR
                }
            },
            Err(_) => DEFAULT_DAILY_REMINDER_HOUR,
        };

        Self {
            timezone,
            daily_reminder_hour,
            push_batch_size: parse_env_or("PUSH_BATCH_SIZE", DEFAULT_PUSH_BATCH_SIZE),
            external_call_timeout_millis: parse_env_or(
                "EXTERNAL_CALL_TIMEOUT_MILLIS",
                DEFAULT_EXTERNAL_CALL_TIMEOUT_MILLIS,
            ),
            preparation_buffer_millis: parse_env_or(
                "PREPARATION_BUFFER_MILLIS",
                DEFAULT_PREPARATION_BUFFER_MILLIS,
            ),
            outbox_poll_interval_secs: parse_env_or(
                "OUTBOX_POLL_INTERVAL_SECS",
                DEFAULT_OUTBOX_POLL_INTERVAL_SECS,
            ),
        }
    }
}

fn parse_env_or<T: std::str::FromStr + std::fmt::Display>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(value) => match value.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    var, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
