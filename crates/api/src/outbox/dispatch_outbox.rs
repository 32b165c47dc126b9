use super::{FinalizeQuickScheduleHandler, OutboxHandler};
use crate::shared::usecase::UseCase;
use daybell_infra::DaybellContext;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{error, warn};

const CLAIM_LIMIT: i64 = 50;

/// Drains PENDING outbox rows and hands each to the handler registered for
/// its event type. Rows are claimed atomically, so the use case is safe to
/// run concurrently (post-commit trigger racing the polling job).
pub struct DispatchOutboxUseCase {
    handlers: Vec<Box<dyn OutboxHandler>>,
}

impl DispatchOutboxUseCase {
    /// Registry with test-provided handlers instead of the defaults.
    pub fn with_handlers(handlers: Vec<Box<dyn OutboxHandler>>) -> Self {
        Self { handlers }
    }

    fn handler_for(&self, event_type: &str) -> Option<&dyn OutboxHandler> {
        self.handlers
            .iter()
            .find(|h| h.event_type() == event_type)
            .map(|h| h.as_ref())
    }
}

impl Default for DispatchOutboxUseCase {
    fn default() -> Self {
        Self {
            handlers: vec![Box::new(FinalizeQuickScheduleHandler)],
        }
    }
}

impl Debug for DispatchOutboxUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchOutboxUseCase")
            .field(
                "handlers",
                &self
                    .handlers
                    .iter()
                    .map(|h| h.event_type())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct DispatchReport {
    pub claimed: usize,
    pub dispatched: usize,
    pub released: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
}

#[async_trait::async_trait]
impl UseCase for DispatchOutboxUseCase {
    type Response = DispatchReport;

    type Error = UseCaseError;

    const NAME: &'static str = "DispatchOutbox";

    async fn execute(&mut self, ctx: &DaybellContext) -> Result<Self::Response, Self::Error> {
        let call_timeout = Duration::from_millis(ctx.config.external_call_timeout_millis);

        let messages = tokio::time::timeout(call_timeout, ctx.repos.outbox.claim_pending(CLAIM_LIMIT))
            .await
            .map_err(|_| UseCaseError::StorageError)?
            .map_err(|_| UseCaseError::StorageError)?;

        let mut report = DispatchReport {
            claimed: messages.len(),
            ..Default::default()
        };

        for message in messages {
            let handler = match self.handler_for(&message.event_type) {
                Some(handler) => handler,
                None => {
                    warn!(
                        "No handler registered for outbox event type: {}, marking row: {} as failed",
                        message.event_type, message.id
                    );
                    if let Err(e) = ctx.repos.outbox.mark_failed(&message.id).await {
                        error!("Unable to mark outbox row: {} as failed: {:?}", message.id, e);
                    }
                    report.failed += 1;
                    continue;
                }
            };

            match tokio::time::timeout(call_timeout, handler.handle(&message.payload, ctx)).await {
                Ok(Ok(())) => {
                    if let Err(e) = ctx.repos.outbox.mark_dispatched(&message.id).await {
                        // The row stays IN_PROGRESS and needs operator
                        // attention; the handler side effect is already done.
                        error!(
                            "Unable to mark outbox row: {} as dispatched: {:?}",
                            message.id, e
                        );
                        continue;
                    }
                    report.dispatched += 1;
                }
                Ok(Err(e)) => {
                    warn!(
                        "Handler for outbox row: {} failed: {:?}, releasing for retry",
                        message.id, e
                    );
                    if let Err(release_err) = ctx.repos.outbox.release(&message.id).await {
                        // The row is stranded IN_PROGRESS until released
                        error!(
                            "Unable to release outbox row: {} back to pending: {:?}",
                            message.id, release_err
                        );
                    }
                    report.released += 1;
                }
                Err(_) => {
                    warn!(
                        "Handler for outbox row: {} timed out after {:?}, releasing for retry",
                        message.id, call_timeout
                    );
                    if let Err(release_err) = ctx.repos.outbox.release(&message.id).await {
                        error!(
                            "Unable to release outbox row: {} back to pending: {:?}",
                            message.id, release_err
                        );
                    }
                    report.released += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybell_domain::{OutboxMessage, OutboxStatus, ID};
    use daybell_infra::{setup_context_inmemory, IOutboxRepo};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl OutboxHandler for CountingHandler {
        fn event_type(&self) -> &'static str {
            "test.counted"
        }

        async fn handle(&self, _payload: &str, _ctx: &DaybellContext) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("Handler failure");
            }
            Ok(())
        }
    }

    fn counted_message(created_at: i64) -> OutboxMessage {
        OutboxMessage::new("test.counted", "{}".to_string(), created_at)
    }

    #[tokio::test]
    async fn dispatches_pending_rows_exactly_once() {
        let ctx = setup_context_inmemory();
        ctx.repos.outbox.insert(&counted_message(100)).await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let mut usecase = DispatchOutboxUseCase::with_handlers(vec![Box::new(CountingHandler {
            calls: calls.clone(),
            fail: false,
        })]);

        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // A second run finds nothing to do
        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(report.claimed, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let dispatched = ctx
            .repos
            .outbox
            .find_by_status(OutboxStatus::Dispatched)
            .await
            .unwrap();
        assert_eq!(dispatched.len(), 1);
    }

    #[tokio::test]
    async fn handler_failure_releases_the_row_for_retry() {
        let ctx = setup_context_inmemory();
        ctx.repos.outbox.insert(&counted_message(100)).await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let mut failing = DispatchOutboxUseCase::with_handlers(vec![Box::new(CountingHandler {
            calls: calls.clone(),
            fail: true,
        })]);
        let report = failing.execute(&ctx).await.unwrap();
        assert_eq!(report.released, 1);

        let pending = ctx
            .repos
            .outbox
            .find_by_status(OutboxStatus::Pending)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        // Next run retries it successfully
        let mut succeeding = DispatchOutboxUseCase::with_handlers(vec![Box::new(
            CountingHandler {
                calls: calls.clone(),
                fail: false,
            },
        )]);
        let report = succeeding.execute(&ctx).await.unwrap();
        assert_eq!(report.dispatched, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_event_type_is_marked_failed() {
        let ctx = setup_context_inmemory();
        ctx.repos
            .outbox
            .insert(&OutboxMessage::new("unknown.event", "{}".to_string(), 100))
            .await
            .unwrap();

        let mut usecase = DispatchOutboxUseCase::default();
        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(report.failed, 1);

        let failed = ctx
            .repos
            .outbox
            .find_by_status(OutboxStatus::Failed)
            .await
            .unwrap();
        assert_eq!(failed.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_runs_never_double_process_a_row() {
        let ctx = setup_context_inmemory();
        ctx.repos.outbox.insert(&counted_message(100)).await.unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let mut tasks = Vec::new();
        for _ in 0..2 {
            let ctx = ctx.clone();
            let calls = calls.clone();
            tasks.push(tokio::spawn(async move {
                let mut usecase =
                    DispatchOutboxUseCase::with_handlers(vec![Box::new(CountingHandler {
                        calls,
                        fail: false,
                    })]);
                usecase.execute(&ctx).await.unwrap()
            }));
        }

        let mut dispatched = 0;
        for task in tasks {
            dispatched += task.await.unwrap().dispatched;
        }

        assert_eq!(dispatched, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Outbox store whose release always fails, like a dropped connection.
    struct StrandedReleaseRepo {
        messages: Mutex<Vec<OutboxMessage>>,
    }

    impl StrandedReleaseRepo {
        fn new() -> Self {
            Self {
                messages: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl IOutboxRepo for StrandedReleaseRepo {
        async fn insert(&self, message: &OutboxMessage) -> anyhow::Result<()> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn claim_pending(&self, limit: i64) -> anyhow::Result<Vec<OutboxMessage>> {
            let mut messages = self.messages.lock().unwrap();
            let mut claimed = Vec::new();
            for message in messages.iter_mut() {
                if message.status == OutboxStatus::Pending && (claimed.len() as i64) < limit {
                    message.status = OutboxStatus::InProgress;
                    claimed.push(message.clone());
                }
            }
            Ok(claimed)
        }

        async fn mark_dispatched(&self, message_id: &ID) -> anyhow::Result<()> {
            for message in self.messages.lock().unwrap().iter_mut() {
                if &message.id == message_id {
                    message.status = OutboxStatus::Dispatched;
                }
            }
            Ok(())
        }

        async fn mark_failed(&self, message_id: &ID) -> anyhow::Result<()> {
            for message in self.messages.lock().unwrap().iter_mut() {
                if &message.id == message_id {
                    message.status = OutboxStatus::Failed;
                }
            }
            Ok(())
        }

        async fn release(&self, _message_id: &ID) -> anyhow::Result<()> {
            anyhow::bail!("Connection lost")
        }

        async fn find_by_status(&self, status: OutboxStatus) -> anyhow::Result<Vec<OutboxMessage>> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.status == status)
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn failed_release_does_not_abort_the_run() {
        let mut ctx = setup_context_inmemory();
        let repo = Arc::new(StrandedReleaseRepo::new());
        repo.insert(&counted_message(100)).await.unwrap();
        repo.insert(&counted_message(200)).await.unwrap();
        ctx.repos.outbox = repo.clone();

        let calls = Arc::new(AtomicUsize::new(0));
        let mut usecase = DispatchOutboxUseCase::with_handlers(vec![Box::new(CountingHandler {
            calls: calls.clone(),
            fail: true,
        })]);

        let report = usecase.execute(&ctx).await.unwrap();
        assert_eq!(report.claimed, 2);
        assert_eq!(report.released, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // Both rows are stranded because release never reached storage
        let stranded = repo
            .find_by_status(OutboxStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(stranded.len(), 2);
    }
}
