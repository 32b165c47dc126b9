use super::IUserRepo;
use crate::repos::shared::inmemory_repo;
use daybell_domain::User;
use std::sync::Mutex;

pub struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        inmemory_repo::insert(user, &self.users);
        Ok(())
    }

    async fn find_all_daily_reminder_enabled(&self) -> anyhow::Result<Vec<User>> {
        Ok(inmemory_repo::find_by(&self.users, |u| {
            u.daily_reminder_enabled
        }))
    }
}
