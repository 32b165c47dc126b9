use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::str::FromStr;
use thiserror::Error;

/// How an alarm presents itself on the device when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmMode {
    Silent,
    Vibrate,
    Sound,
}

#[derive(Error, Debug, PartialEq)]
#[error("Alarm mode: {0} is not recognized")]
pub struct InvalidAlarmMode(pub String);

impl AlarmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silent => "SILENT",
            Self::Vibrate => "VIBRATE",
            Self::Sound => "SOUND",
        }
    }
}

impl FromStr for AlarmMode {
    type Err = InvalidAlarmMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SILENT" => Ok(Self::Silent),
            "VIBRATE" => Ok(Self::Vibrate),
            "SOUND" => Ok(Self::Sound),
            _ => Err(InvalidAlarmMode(s.to_string())),
        }
    }
}

/// Minutes between snooze re-fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnoozeInterval {
    ThreeMinutes,
    FiveMinutes,
    TenMinutes,
    FifteenMinutes,
    ThirtyMinutes,
}

#[derive(Error, Debug, PartialEq)]
#[error("Snooze interval: {0} is not recognized")]
pub struct InvalidSnoozeInterval(pub String);

impl SnoozeInterval {
    pub fn minutes(&self) -> u32 {
        match self {
            Self::ThreeMinutes => 3,
            Self::FiveMinutes => 5,
            Self::TenMinutes => 10,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
        }
    }
}

impl FromStr for SnoozeInterval {
    type Err = InvalidSnoozeInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "3" => Ok(Self::ThreeMinutes),
            "5" => Ok(Self::FiveMinutes),
            "10" => Ok(Self::TenMinutes),
            "15" => Ok(Self::FifteenMinutes),
            "30" => Ok(Self::ThirtyMinutes),
            _ => Err(InvalidSnoozeInterval(s.to_string())),
        }
    }
}

/// How many times a snoozed alarm re-fires before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnoozeCount {
    Once,
    Twice,
    ThreeTimes,
    FiveTimes,
    Infinite,
}

#[derive(Error, Debug, PartialEq)]
#[error("Snooze count: {0} is not recognized")]
pub struct InvalidSnoozeCount(pub String);

impl SnoozeCount {
    /// `None` means the alarm keeps re-firing until dismissed.
    pub fn times(&self) -> Option<u32> {
        match self {
            Self::Once => Some(1),
            Self::Twice => Some(2),
            Self::ThreeTimes => Some(3),
            Self::FiveTimes => Some(5),
            Self::Infinite => None,
        }
    }
}

impl FromStr for SnoozeCount {
    type Err = InvalidSnoozeCount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONCE" => Ok(Self::Once),
            "TWICE" => Ok(Self::Twice),
            "THREE_TIMES" => Ok(Self::ThreeTimes),
            "FIVE_TIMES" => Ok(Self::FiveTimes),
            "INFINITE" => Ok(Self::Infinite),
            _ => Err(InvalidSnoozeCount(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snooze {
    pub is_enabled: bool,
    pub interval: SnoozeInterval,
    pub count: SnoozeCount,
}

impl Default for Snooze {
    fn default() -> Self {
        Self {
            is_enabled: false,
            interval: SnoozeInterval::FiveMinutes,
            count: SnoozeCount::Once,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SoundCategory {
    Basic,
    Nature,
    Melody,
}

#[derive(Error, Debug, PartialEq)]
#[error("Sound category: {0} is not recognized")]
pub struct InvalidSoundCategory(pub String);

impl FromStr for SoundCategory {
    type Err = InvalidSoundCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BASIC" => Ok(Self::Basic),
            "NATURE" => Ok(Self::Nature),
            "MELODY" => Ok(Self::Melody),
            _ => Err(InvalidSoundCategory(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RingTone {
    Basic,
    Marimba,
    Chime,
    Forest,
    Wave,
}

#[derive(Error, Debug, PartialEq)]
#[error("Ring tone: {0} is not recognized")]
pub struct InvalidRingTone(pub String);

impl FromStr for RingTone {
    type Err = InvalidRingTone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BASIC" => Ok(Self::Basic),
            "MARIMBA" => Ok(Self::Marimba),
            "CHIME" => Ok(Self::Chime),
            "FOREST" => Ok(Self::Forest),
            "WAVE" => Ok(Self::Wave),
            _ => Err(InvalidRingTone(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Volume: {0} is outside of the allowed range [0.0, 1.0]")]
pub struct InvalidVolume(pub f64);

// Deserialization funnels through `Sound::new` so stored or payload data
// cannot smuggle in an out-of-range volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SoundData")]
pub struct Sound {
    pub category: SoundCategory,
    pub ring_tone: RingTone,
    volume: f64,
}

#[derive(Deserialize)]
struct SoundData {
    category: SoundCategory,
    ring_tone: RingTone,
    volume: f64,
}

impl TryFrom<SoundData> for Sound {
    type Error = InvalidVolume;

    fn try_from(data: SoundData) -> Result<Self, Self::Error> {
        Sound::new(data.category, data.ring_tone, data.volume)
    }
}

impl Sound {
    pub fn new(category: SoundCategory, ring_tone: RingTone, volume: f64) -> Result<Self, InvalidVolume> {
        if !(0.0..=1.0).contains(&volume) || volume.is_nan() {
            return Err(InvalidVolume(volume));
        }
        Ok(Self {
            category,
            ring_tone,
            volume,
        })
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self {
            category: SoundCategory::Basic,
            ring_tone: RingTone::Basic,
            volume: 0.5,
        }
    }
}

/// One of the two alarms owned by a `Schedule`. `triggered_at` is the absolute
/// instant in millis at which this alarm fires for the current occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub mode: AlarmMode,
    pub is_enabled: bool,
    pub triggered_at: i64,
    pub snooze: Snooze,
    pub sound: Sound,
}

impl Alarm {
    /// Placeholder alarm pointing at `triggered_at`, left disabled until its
    /// trigger instant has been finalized.
    pub fn disabled_at(triggered_at: i64) -> Self {
        Self {
            mode: AlarmMode::Sound,
            is_enabled: false,
            triggered_at,
            snooze: Snooze::default(),
            sound: Sound::default(),
        }
    }
}
