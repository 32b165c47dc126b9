use super::IDeviceTokenRepo;
use crate::repos::shared::{inmemory_repo, repo::DeleteResult};
use daybell_domain::{DeviceToken, ID};
use std::sync::Mutex;

pub struct InMemoryDeviceTokenRepo {
    device_tokens: Mutex<Vec<DeviceToken>>,
}

impl InMemoryDeviceTokenRepo {
    pub fn new() -> Self {
        Self {
            device_tokens: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDeviceTokenRepo for InMemoryDeviceTokenRepo {
    async fn upsert_by_token(&self, device_token: &DeviceToken) -> anyhow::Result<()> {
        let mut device_tokens = self.device_tokens.lock().unwrap();
        match device_tokens
            .iter_mut()
            .find(|t| t.token == device_token.token)
        {
            Some(existing) => {
                existing.user_id = device_token.user_id.clone();
                existing.device_type = device_token.device_type;
            }
            None => device_tokens.push(device_token.clone()),
        }
        Ok(())
    }

    async fn find_by_users(&self, user_ids: &[ID]) -> anyhow::Result<Vec<DeviceToken>> {
        Ok(inmemory_repo::find_by(&self.device_tokens, |t| {
            user_ids.contains(&t.user_id)
        }))
    }

    async fn delete_by_token(&self, token: &str) -> anyhow::Result<DeleteResult> {
        Ok(inmemory_repo::delete_by(&self.device_tokens, |t| {
            t.token == token
        }))
    }

    async fn delete_by_tokens(&self, tokens: &[String]) -> anyhow::Result<DeleteResult> {
        Ok(inmemory_repo::delete_by(&self.device_tokens, |t| {
            tokens.contains(&t.token)
        }))
    }
}
