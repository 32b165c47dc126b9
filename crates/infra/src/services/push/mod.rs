mod fcm;

pub use fcm::FcmPushGateway;

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Per-call outcome of a multicast push. `invalid_tokens` contains only
/// tokens the transport reported as unregistered; transient failures count
/// towards `failure_count` but are never classified invalid.
#[derive(Debug, Default)]
pub struct MulticastReport {
    pub success_count: usize,
    pub failure_count: usize,
    pub invalid_tokens: Vec<String>,
}

/// One multicast call to the push transport. Callers must not exceed the
/// transport batch limit; chunking is `NotificationDispatcher`s job.
#[async_trait::async_trait]
pub trait IPushGateway: Send + Sync {
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> anyhow::Result<MulticastReport>;
}

/// Gateway used when no push credentials are configured: drops every
/// notification and reports it as delivered.
pub struct NoopPushGateway {}

#[async_trait::async_trait]
impl IPushGateway for NoopPushGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        _title: &str,
        _body: &str,
    ) -> anyhow::Result<MulticastReport> {
        Ok(MulticastReport {
            success_count: tokens.len(),
            ..Default::default()
        })
    }
}

/// Owns the chunking and timeout contract around a raw push gateway: splits
/// token lists into transport-sized batches, merges invalid-token results and
/// never errors on partial failure. It only errors when a call itself cannot
/// be completed (transport error or timeout).
pub struct NotificationDispatcher {
    gateway: Arc<dyn IPushGateway>,
    batch_size: usize,
    call_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(gateway: Arc<dyn IPushGateway>, batch_size: usize, call_timeout: Duration) -> Self {
        Self {
            gateway,
            batch_size: batch_size.max(1),
            call_timeout,
        }
    }

    /// Sends `title`/`body` to all `tokens` and returns the tokens the
    /// transport reported as permanently invalid. An empty token list
    /// returns immediately without a transport call.
    pub async fn send_to_tokens(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> anyhow::Result<Vec<String>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut success_count = 0;
        let mut failure_count = 0;
        let mut invalid_tokens = Vec::new();

        for chunk in tokens.chunks(self.batch_size) {
            let report = tokio::time::timeout(
                self.call_timeout,
                self.gateway.send_multicast(chunk, title, body),
            )
            .await
            .map_err(|_| {
                anyhow::anyhow!("Push multicast timed out after {:?}", self.call_timeout)
            })??;

            success_count += report.success_count;
            failure_count += report.failure_count;
            invalid_tokens.extend(report.invalid_tokens);
        }

        info!(
            "Push multicast done. Success: {}, failure: {}, invalid tokens: {}",
            success_count,
            failure_count,
            invalid_tokens.len()
        );

        Ok(invalid_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Gateway that records every call and reports the configured tokens
    /// as unregistered.
    struct StaticGateway {
        calls: Mutex<Vec<Vec<String>>>,
        invalid: Vec<String>,
    }

    impl StaticGateway {
        fn new(invalid: Vec<String>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                invalid,
            }
        }
    }

    #[async_trait::async_trait]
    impl IPushGateway for StaticGateway {
        async fn send_multicast(
            &self,
            tokens: &[String],
            _title: &str,
            _body: &str,
        ) -> anyhow::Result<MulticastReport> {
            self.calls.lock().unwrap().push(tokens.to_vec());
            let invalid_tokens = tokens
                .iter()
                .filter(|t| self.invalid.contains(t))
                .cloned()
                .collect::<Vec<_>>();
            Ok(MulticastReport {
                success_count: tokens.len() - invalid_tokens.len(),
                failure_count: invalid_tokens.len(),
                invalid_tokens,
            })
        }
    }

    fn tokens(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_token_list_makes_no_transport_call() {
        let gateway = Arc::new(StaticGateway::new(vec![]));
        let dispatcher =
            NotificationDispatcher::new(gateway.clone(), 500, Duration::from_secs(1));

        let invalid = dispatcher.send_to_tokens(&[], "title", "body").await.unwrap();
        assert!(invalid.is_empty());
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn reports_only_unregistered_tokens_as_invalid() {
        let gateway = Arc::new(StaticGateway::new(tokens(&["token-2"])));
        let dispatcher =
            NotificationDispatcher::new(gateway.clone(), 500, Duration::from_secs(1));

        let invalid = dispatcher
            .send_to_tokens(&tokens(&["token-1", "token-2", "token-3"]), "title", "body")
            .await
            .unwrap();
        assert_eq!(invalid, tokens(&["token-2"]));
    }

    #[tokio::test]
    async fn chunks_to_batch_size_and_merges_results() {
        let gateway = Arc::new(StaticGateway::new(tokens(&["token-1", "token-5"])));
        let dispatcher = NotificationDispatcher::new(gateway.clone(), 2, Duration::from_secs(1));

        let all = tokens(&["token-1", "token-2", "token-3", "token-4", "token-5"]);
        let invalid = dispatcher.send_to_tokens(&all, "title", "body").await.unwrap();

        assert_eq!(invalid, tokens(&["token-1", "token-5"]));
        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.len() <= 2));
    }
}
