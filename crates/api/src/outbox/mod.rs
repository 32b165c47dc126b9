mod dispatch_outbox;
mod finalize_quick_schedule;

pub use dispatch_outbox::DispatchOutboxUseCase;
pub use finalize_quick_schedule::FinalizeQuickScheduleHandler;

use daybell_infra::DaybellContext;

/// Downstream consumer of one outbox event type.
///
/// Dispatch is at-least-once: a crash after the handler succeeded but before
/// the row was marked dispatched causes redelivery, so handlers must
/// tolerate duplicate invocations for the same event.
#[async_trait::async_trait]
pub trait OutboxHandler: Send + Sync {
    fn event_type(&self) -> &'static str;
    async fn handle(&self, payload: &str, ctx: &DaybellContext) -> anyhow::Result<()>;
}
