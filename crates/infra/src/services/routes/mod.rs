use daybell_domain::ID;
use serde::Deserialize;
use tracing::warn;

/// Black-box travel-duration estimator between two stored places.
#[async_trait::async_trait]
pub trait IRouteDurationProvider: Send + Sync {
    async fn estimate_duration_millis(
        &self,
        departure_place_id: &ID,
        arrival_place_id: &ID,
    ) -> anyhow::Result<i64>;
}

#[derive(Debug, Deserialize)]
struct RouteDurationResponse {
    duration_millis: i64,
}

/// Estimator backed by the external route API.
pub struct HttpRouteDurationProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRouteDurationProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        let base_url = match std::env::var("ROUTE_API_URL") {
            Ok(url) => url,
            Err(_) => {
                warn!("Did not find ROUTE_API_URL environment variable. Route lookups will fail.");
                String::new()
            }
        };
        Self::new(base_url)
    }
}

#[async_trait::async_trait]
impl IRouteDurationProvider for HttpRouteDurationProvider {
    async fn estimate_duration_millis(
        &self,
        departure_place_id: &ID,
        arrival_place_id: &ID,
    ) -> anyhow::Result<i64> {
        if self.base_url.is_empty() {
            anyhow::bail!("Route API is not configured");
        }

        let url = format!(
            "{}/routes/duration?from={}&to={}",
            self.base_url, departure_place_id, arrival_place_id
        );
        let res = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<RouteDurationResponse>()
            .await?;

        Ok(res.duration_millis)
    }
}

/// Estimator returning a fixed duration, used by tests and the in-memory
/// context.
pub struct FixedRouteDurationProvider {
    duration_millis: i64,
}

impl FixedRouteDurationProvider {
    pub fn new(duration_millis: i64) -> Self {
        Self { duration_millis }
    }
}

#[async_trait::async_trait]
impl IRouteDurationProvider for FixedRouteDurationProvider {
    async fn estimate_duration_millis(
        &self,
        _departure_place_id: &ID,
        _arrival_place_id: &ID,
    ) -> anyhow::Result<i64> {
        Ok(self.duration_millis)
    }
}
