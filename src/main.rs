mod telemetry;

use daybell_api::Application;
use daybell_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("daybell".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context().await;

    Application::new(context).start().await
}
