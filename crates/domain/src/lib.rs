mod alarm;
mod device_token;
mod outbox;
mod schedule;
mod shared;
mod user;

pub use alarm::{
    Alarm, AlarmMode, InvalidAlarmMode, InvalidRingTone, InvalidSnoozeCount, InvalidSnoozeInterval,
    InvalidSoundCategory, InvalidVolume, RingTone, Snooze, SnoozeCount, SnoozeInterval, Sound,
    SoundCategory,
};
pub use device_token::{DeviceToken, DeviceType, InvalidDeviceType};
pub use outbox::{InvalidOutboxStatus, OutboxMessage, OutboxStatus, QuickScheduleRequested};
pub use schedule::{weekday_code, InvalidRepeatDay, RepeatDays, Schedule};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use user::User;
