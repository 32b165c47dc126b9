use super::IOutboxRepo;
use crate::repos::shared::inmemory_repo;
use daybell_domain::{OutboxMessage, OutboxStatus, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryOutboxRepo {
    // Shared with `InMemoryScheduleRepo`, see `Repos::create_inmemory`.
    messages: Arc<Mutex<Vec<OutboxMessage>>>,
}

impl InMemoryOutboxRepo {
    pub fn new(messages: Arc<Mutex<Vec<OutboxMessage>>>) -> Self {
        Self { messages }
    }

    fn set_status(&self, message_id: &ID, from: OutboxStatus, to: OutboxStatus) {
        inmemory_repo::update_many(
            &self.messages,
            |m: &OutboxMessage| &m.id == message_id && m.status == from,
            |m| m.status = to,
        );
    }
}

#[async_trait::async_trait]
impl IOutboxRepo for InMemoryOutboxRepo {
    async fn insert(&self, message: &OutboxMessage) -> anyhow::Result<()> {
        inmemory_repo::insert(message, &self.messages);
        Ok(())
    }

    async fn claim_pending(&self, limit: i64) -> anyhow::Result<Vec<OutboxMessage>> {
        // One sweep under the lock: status flips and the returned snapshot
        // are indivisible, so concurrent runs cannot claim the same row.
        let mut messages = self.messages.lock().unwrap();
        let mut pending = messages
            .iter_mut()
            .filter(|m| m.status == OutboxStatus::Pending)
            .collect::<Vec<_>>();
        pending.sort_by_key(|m| m.created_at);

        let mut claimed = Vec::new();
        for message in pending.into_iter().take(limit as usize) {
            message.status = OutboxStatus::InProgress;
            claimed.push(message.clone());
        }
        Ok(claimed)
    }

    async fn mark_dispatched(&self, message_id: &ID) -> anyhow::Result<()> {
        self.set_status(message_id, OutboxStatus::InProgress, OutboxStatus::Dispatched);
        Ok(())
    }

    async fn mark_failed(&self, message_id: &ID) -> anyhow::Result<()> {
        self.set_status(message_id, OutboxStatus::InProgress, OutboxStatus::Failed);
        Ok(())
    }

    async fn release(&self, message_id: &ID) -> anyhow::Result<()> {
        self.set_status(message_id, OutboxStatus::InProgress, OutboxStatus::Pending);
        Ok(())
    }

    async fn find_by_status(&self, status: OutboxStatus) -> anyhow::Result<Vec<OutboxMessage>> {
        Ok(inmemory_repo::find_by(&self.messages, |m| {
            m.status == status
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_factory(created_at: i64) -> OutboxMessage {
        OutboxMessage::new("quick_schedule.requested", "{}".to_string(), created_at)
    }

    #[tokio::test]
    async fn claims_in_creation_order_and_only_once() {
        let repo = InMemoryOutboxRepo::new(Arc::new(Mutex::new(Vec::new())));
        repo.insert(&message_factory(200)).await.unwrap();
        repo.insert(&message_factory(100)).await.unwrap();

        let claimed = repo.claim_pending(10).await.unwrap();
        assert_eq!(claimed.len(), 2);
        assert_eq!(claimed[0].created_at, 100);
        assert_eq!(claimed[1].created_at, 200);
        assert!(claimed.iter().all(|m| m.status == OutboxStatus::InProgress));

        // Already claimed rows are not claimable again
        assert!(repo.claim_pending(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn released_rows_become_claimable_again() {
        let repo = InMemoryOutboxRepo::new(Arc::new(Mutex::new(Vec::new())));
        let message = message_factory(100);
        repo.insert(&message).await.unwrap();

        let claimed = repo.claim_pending(10).await.unwrap();
        assert_eq!(claimed.len(), 1);
        repo.release(&message.id).await.unwrap();

        let reclaimed = repo.claim_pending(10).await.unwrap();
        assert_eq!(reclaimed.len(), 1);
        assert_eq!(reclaimed[0].id, message.id);
    }

    #[tokio::test]
    async fn dispatched_rows_are_terminal() {
        let repo = InMemoryOutboxRepo::new(Arc::new(Mutex::new(Vec::new())));
        let message = message_factory(100);
        repo.insert(&message).await.unwrap();

        repo.claim_pending(10).await.unwrap();
        repo.mark_dispatched(&message.id).await.unwrap();

        assert!(repo.claim_pending(10).await.unwrap().is_empty());
        let dispatched = repo.find_by_status(OutboxStatus::Dispatched).await.unwrap();
        assert_eq!(dispatched.len(), 1);
    }
}
