pub mod device_token;
pub mod job_schedulers;
pub mod outbox;
pub mod reminder;
pub mod schedule;
pub mod shared;

use daybell_infra::DaybellContext;
use job_schedulers::{start_daily_reminder_job, start_outbox_dispatch_job};

/// Owns the background jobs that make up this service: the nightly reminder
/// batch and the outbox polling lane. The boundary API layer drives the use
/// cases in this crate directly.
pub struct Application {
    context: DaybellContext,
}

impl Application {
    pub fn new(context: DaybellContext) -> Self {
        Self { context }
    }

    fn start_job_schedulers(&self) {
        start_daily_reminder_job(self.context.clone());
        start_outbox_dispatch_job(self.context.clone());
    }

    /// Runs until the process receives a shutdown signal.
    pub async fn start(self) -> std::io::Result<()> {
        self.start_job_schedulers();
        tokio::signal::ctrl_c().await
    }
}
