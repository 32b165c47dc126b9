use super::CreateQuickScheduleUseCase;
use crate::outbox::DispatchOutboxUseCase;
use crate::shared::usecase::{execute, Subscriber};
use daybell_domain::Schedule;
use daybell_infra::DaybellContext;

/// Post-commit hook of the transactional outbox: fires only after the
/// producing use case succeeded, and hands dispatch to a detached task so
/// the original caller never waits on the downstream handler's I/O.
pub struct DispatchOutboxOnQuickScheduleCreated;

#[async_trait::async_trait]
impl Subscriber<CreateQuickScheduleUseCase> for DispatchOutboxOnQuickScheduleCreated {
    async fn notify(&self, _e: &Schedule, ctx: &DaybellContext) {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            // Sideeffect, ignore result
            let _ = execute(DispatchOutboxUseCase::default(), &ctx).await;
        });
    }
}
