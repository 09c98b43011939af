//! Prints the first subscribers of the configured publication. Useful to check what the
//! publication API sends back for the stored credentials.
//!
//! Usage: `fetch_subscribers [limit]` (default limit is 10).
use std::process::ExitCode;

use subscriber_metrics::config::get_configuration;
use subscriber_metrics::credential_store::{CredentialStore, FileCredentialStore};
use subscriber_metrics::metrics::annotate_days_to_unsubscribe;
use subscriber_metrics::publication_client::PublicationClient;
use subscriber_metrics::telemetry::{get_subscriber, init_subscriber};

const DEFAULT_LIMIT: u32 = 10;
const PRINTED_SUBSCRIBERS: usize = 5;

#[tokio::main]
async fn main() -> ExitCode {
    let subscriber = get_subscriber(String::from("fetch_subscribers"), String::from("info"));

    init_subscriber(subscriber);

    match fetch_subscribers().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Error fetching subscribers: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn fetch_subscribers() -> Result<(), Box<dyn std::error::Error>> {
    let limit = match std::env::args().nth(1) {
        Some(limit) => limit.parse::<u32>()?,
        None => DEFAULT_LIMIT,
    };
    let config = get_configuration()?;
    let credential_store = FileCredentialStore::new(config.get_credential_store_path());
    let credentials = credential_store.get()?;
    let publication_client =
        PublicationClient::from_settings(&config.get_publication_api(), credentials)?;

    tracing::info!("Attempting to fetch subscribers...");

    let mut page = publication_client.fetch_page(1, limit).await?;

    annotate_days_to_unsubscribe(&mut page.data);

    tracing::info!(
        "Successfully fetched {} of {} subscribers",
        page.data.len(),
        page.total
    );

    for subscriber in page.data.iter().take(PRINTED_SUBSCRIBERS) {
        println!("{}", serde_json::to_string_pretty(subscriber)?);
    }

    Ok(())
}
