use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle of an outbox row.
///
/// PENDING rows are eligible for dispatch. A dispatcher run claims a row by
/// moving it to IN_PROGRESS, which is what keeps two concurrent runs from
/// handling the same row. DISPATCHED is terminal success; FAILED is terminal
/// and reserved for rows no handler is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxStatus {
    Pending,
    InProgress,
    Dispatched,
    Failed,
}

#[derive(Error, Debug, PartialEq)]
#[error("Outbox status: {0} is not recognized")]
pub struct InvalidOutboxStatus(pub String);

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Dispatched => "DISPATCHED",
            Self::Failed => "FAILED",
        }
    }
}

impl FromStr for OutboxStatus {
    type Err = InvalidOutboxStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "DISPATCHED" => Ok(Self::Dispatched),
            "FAILED" => Ok(Self::Failed),
            _ => Err(InvalidOutboxStatus(s.to_string())),
        }
    }
}

/// A domain event persisted in the same transaction as the business change
/// it describes, and published to its handler strictly after that
/// transaction has committed.
#[derive(Debug, Clone)]
pub struct OutboxMessage {
    pub id: ID,
    pub event_type: String,
    pub payload: String,
    pub status: OutboxStatus,
    pub created_at: i64,
}

impl OutboxMessage {
    pub fn new(event_type: &str, payload: String, created_at: i64) -> Self {
        Self {
            id: Default::default(),
            event_type: event_type.to_string(),
            payload,
            status: OutboxStatus::Pending,
            created_at,
        }
    }
}

impl Entity for OutboxMessage {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Raised when a quick schedule has been created and its alarm instants
/// still need to be finalized with a route-duration lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickScheduleRequested {
    pub schedule_id: ID,
    pub user_id: ID,
    pub departure_place_id: ID,
    pub arrival_place_id: ID,
    pub appointment_at: i64,
}

impl QuickScheduleRequested {
    pub const EVENT_TYPE: &'static str = "quick_schedule.requested";
}
