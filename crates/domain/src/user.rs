use crate::shared::entity::{Entity, ID};

/// The slice of the account model this core needs: identity and the
/// daily-reminder preference.
#[derive(Debug, Clone)]
pub struct User {
    pub id: ID,
    pub daily_reminder_enabled: bool,
}

impl User {
    pub fn new() -> Self {
        Self {
            id: Default::default(),
            daily_reminder_enabled: false,
        }
    }

    pub fn with_daily_reminder() -> Self {
        Self {
            id: Default::default(),
            daily_reminder_enabled: true,
        }
    }
}

impl Default for User {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
