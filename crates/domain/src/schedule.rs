use crate::{
    alarm::Alarm,
    shared::entity::{Entity, ID},
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// Fixed weekday mapping: Monday = 1 .. Sunday = 7.
pub fn weekday_code(date: &NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

#[derive(Error, Debug, PartialEq)]
#[error("Repeat day: {0} is not a valid weekday code (expected 1..=7)")]
pub struct InvalidRepeatDay(pub String);

/// Set of weekday codes a repeating schedule fires on. Stored as a
/// comma-delimited string, so parsing and rendering are an explicit codec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatDays(Vec<u8>);

impl RepeatDays {
    pub fn new(days: &[u8]) -> Result<Self, InvalidRepeatDay> {
        for day in days {
            if !(1..=7).contains(day) {
                return Err(InvalidRepeatDay(day.to_string()));
            }
        }
        let mut days = days.to_vec();
        days.sort_unstable();
        days.dedup();
        Ok(Self(days))
    }

    pub fn contains(&self, code: u8) -> bool {
        self.0.binary_search(&code).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for RepeatDays {
    type Err = InvalidRepeatDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let mut days = Vec::new();
        for token in s.split(',') {
            let day = token
                .trim()
                .parse::<u8>()
                .map_err(|_| InvalidRepeatDay(token.to_string()))?;
            days.push(day);
        }
        Self::new(&days)
    }
}

impl Display for RepeatDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let days = self
            .0
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", days)
    }
}

/// A user's schedule with its two owned alarms.
///
/// When `is_repeat` is true the occurrences are derived from `repeat_days`
/// and `appointment_at` is not consulted. When false, `appointment_at` is the
/// authoritative single occurrence and `repeat_days` is ignored.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub id: ID,
    pub user_id: ID,
    pub title: String,
    pub is_repeat: bool,
    pub repeat_days: RepeatDays,
    pub appointment_at: Option<i64>,
    pub preparation_alarm: Alarm,
    pub departure_alarm: Alarm,
    pub departure_place_id: Option<ID>,
    pub arrival_place_id: Option<ID>,
}

impl Schedule {
    /// The earliest enabled alarm instant strictly after `now`, if any.
    /// If both alarms share an identical future instant either may win.
    pub fn next_alarm_at(&self, now: i64) -> Option<i64> {
        [&self.preparation_alarm, &self.departure_alarm]
            .iter()
            .filter(|alarm| alarm.is_enabled && alarm.triggered_at > now)
            .map(|alarm| alarm.triggered_at)
            .min()
    }

    /// Whether at least one alarm is enabled, regardless of time. Used for
    /// display and sort priority only, never for dispatch decisions.
    pub fn has_any_active_alarm(&self) -> bool {
        self.preparation_alarm.is_enabled || self.departure_alarm.is_enabled
    }

    /// Whether a repeating schedule fires on the given date. Callers must
    /// branch on `is_repeat` first; non-repeating schedules are filtered by
    /// `appointment_at` range instead.
    pub fn is_scheduled_for_date(&self, date: &NaiveDate) -> bool {
        self.is_repeat && self.repeat_days.contains(weekday_code(date))
    }
}

impl Entity for Schedule {
    fn id(&self) -> &ID {
        &self.id
    }
}
