use subscriber_metrics::config::get_configuration;
use subscriber_metrics::startup::Application;
use subscriber_metrics::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(String::from("subscriber_metrics"), String::from("info"));

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config.clone()).await?;

    tracing::info!("Server listening on {}", config.get_address());

    application.run_until_stop().await
}
