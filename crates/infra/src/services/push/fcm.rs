use super::{IPushGateway, MulticastReport};
use serde::{Deserialize, Serialize};

const FCM_SEND_URL: &str = "https://fcm.googleapis.com/fcm/send";

// Per-token error codes that mean the registration is permanently gone.
// Everything else (rate limiting, transient unavailability) is a plain
// failure and must not trigger token deletion.
const UNREGISTERED_ERRORS: [&str; 2] = ["NotRegistered", "InvalidRegistration"];

/// FCM legacy HTTP multicast transport.
pub struct FcmPushGateway {
    server_key: String,
    client: reqwest::Client,
}

impl FcmPushGateway {
    pub fn new(server_key: String) -> Self {
        Self {
            server_key,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct FcmMulticastRequest<'a> {
    registration_ids: &'a [String],
    notification: FcmNotification<'a>,
}

#[derive(Debug, Deserialize)]
struct FcmMulticastResponse {
    results: Vec<FcmSendResult>,
}

#[derive(Debug, Deserialize)]
struct FcmSendResult {
    error: Option<String>,
}

// Results come back in token order. A token the response does not cover
// (truncated results) has an unknown outcome: it counts as a failure but is
// never classified invalid.
fn classify_results(tokens: &[String], results: &[FcmSendResult]) -> MulticastReport {
    let mut report = MulticastReport::default();
    for (idx, token) in tokens.iter().enumerate() {
        match results.get(idx) {
            Some(FcmSendResult { error: None }) => report.success_count += 1,
            Some(FcmSendResult { error: Some(error) }) => {
                report.failure_count += 1;
                if UNREGISTERED_ERRORS.contains(&error.as_str()) {
                    report.invalid_tokens.push(token.clone());
                }
            }
            None => report.failure_count += 1,
        }
    }
    report
}

#[async_trait::async_trait]
impl IPushGateway for FcmPushGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> anyhow::Result<MulticastReport> {
        let request = FcmMulticastRequest {
            registration_ids: tokens,
            notification: FcmNotification { title, body },
        };

        let res = self
            .client
            .post(FCM_SEND_URL)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<FcmMulticastResponse>()
            .await?;

        Ok(classify_results(tokens, &res.results))
    }
}
