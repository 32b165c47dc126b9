mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
use repos::Repos;
pub use repos::{
    DeleteResult, IDeviceTokenRepo, IOutboxRepo, IScheduleRepo, IUserRepo,
};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tracing::warn;

#[derive(Clone)]
pub struct DaybellContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub push: Arc<dyn IPushGateway>,
    pub routes: Arc<dyn IRouteDurationProvider>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl DaybellContext {
    async fn create(params: ContextParams) -> Self {
        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .expect("Postgres credentials must be set and valid");
        let config = Config::new();
        let push = create_push_gateway();
        let routes: Arc<dyn IRouteDurationProvider> =
            Arc::new(HttpRouteDurationProvider::from_env());
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            push,
            routes,
        }
    }
}

fn create_push_gateway() -> Arc<dyn IPushGateway> {
    match std::env::var("FCM_SERVER_KEY") {
        Ok(server_key) => Arc::new(FcmPushGateway::new(server_key)),
        Err(_) => {
            warn!("Did not find FCM_SERVER_KEY environment variable. Push notifications will be dropped.");
            Arc::new(NoopPushGateway {})
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> DaybellContext {
    DaybellContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string(),
    })
    .await
}

/// Context backed by in-memory repositories and no-op external services,
/// used by tests and local development without infrastructure.
pub fn setup_context_inmemory() -> DaybellContext {
    DaybellContext {
        repos: Repos::create_inmemory(),
        config: Config::new(),
        sys: Arc::new(RealSys {}),
        push: Arc::new(NoopPushGateway {}),
        routes: Arc::new(FixedRouteDurationProvider::new(1000 * 60 * 30)),
    }
}

fn get_psql_connection_string() -> String {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .unwrap_or_else(|_| panic!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> Result<(), MigrateError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string())
        .await
        .expect("TO CONNECT TO POSTGRES");

    sqlx::migrate!().run(&pool).await
}
