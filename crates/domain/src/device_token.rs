use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceType {
    Ios,
    Android,
}

#[derive(Error, Debug, PartialEq)]
#[error("Device type: {0} is not recognized")]
pub struct InvalidDeviceType(pub String);

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ios => "IOS",
            Self::Android => "ANDROID",
        }
    }
}

impl FromStr for DeviceType {
    type Err = InvalidDeviceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IOS" => Ok(Self::Ios),
            "ANDROID" => Ok(Self::Android),
            _ => Err(InvalidDeviceType(s.to_string())),
        }
    }
}

/// A push registration. The token string is globally unique; re-registering
/// an existing token transfers it to the new owner.
#[derive(Debug, Clone)]
pub struct DeviceToken {
    pub id: ID,
    pub user_id: ID,
    pub token: String,
    pub device_type: DeviceType,
}

impl DeviceToken {
    pub fn new(user_id: ID, token: String, device_type: DeviceType) -> Self {
        Self {
            id: Default::default(),
            user_id,
            token,
            device_type,
        }
    }
}

impl Entity for DeviceToken {
    fn id(&self) -> &ID {
        &self.id
    }
}
