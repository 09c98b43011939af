use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time;

use crate::config::PublicationApiSettings;
use crate::domain::credentials::Credentials;
use crate::domain::subscriber::{Subscriber, SubscriberPage, SubscriberStats};
use crate::domain::subscriber_status::SubscriberStatus;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const DEFAULT_MAX_PAGES: u32 = 500;
const CONNECTION_TEST_PAGE_SIZE: u32 = 1;
const GENERIC_ERROR_MESSAGE: &str = "Unexpected response from the publication API.";
/// Largest page size accepted by the upstream API.
pub const MAX_PAGE_SIZE: u32 = 1000;
/// Nested fields requested on every subscription listing.
const EXPANSIONS: [&str; 1] = ["stats"];

#[derive(thiserror::Error, Debug)]
pub enum PublicationClientError {
    #[error("Invalid API key or unauthorized access.")]
    Auth,
    #[error("Publication not found. Please verify your publication ID.")]
    NotFound,
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("Failed to set up the publication API client.")]
    Setup(#[source] reqwest::Error),
    #[error("Failed to reach the publication API.")]
    Transport(#[source] reqwest::Error),
    #[error("Stopped after {0} pages without reaching the end of the subscriber list.")]
    PaginationLimitExceeded(u32),
}

/// Client for the subscriptions endpoint of the publication platform.
pub struct PublicationClient {
    http_client: Client,
    base_url: String,
    credentials: Credentials,
    max_pages: u32,
}

impl PublicationClient {
    pub fn new(
        base_url: String,
        credentials: Credentials,
        timeout: Option<time::Duration>,
    ) -> Result<PublicationClient, PublicationClientError> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()
            .map_err(PublicationClientError::Setup)?;

        Ok(PublicationClient {
            http_client,
            base_url,
            credentials,
            max_pages: DEFAULT_MAX_PAGES,
        })
    }

    pub fn from_settings(
        settings: &PublicationApiSettings,
        credentials: Credentials,
    ) -> Result<PublicationClient, PublicationClientError> {
        let client = Self::new(
            settings.get_base_url(),
            credentials,
            Some(settings.get_timeout()),
        )?;

        Ok(client.with_max_pages(settings.get_max_pages()))
    }

    pub fn with_max_pages(mut self, max_pages: NonZeroU32) -> Self {
        self.max_pages = max_pages.get();
        self
    }

    #[tracing::instrument(
        name = "Fetching a page of subscribers",
        skip(self),
        fields(publication_id = %self.credentials.publication_id())
    )]
    pub async fn fetch_page(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<SubscriberPage, PublicationClientError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let url = format!(
            "{}/publications/{}/subscriptions",
            self.base_url,
            self.credentials.publication_id()
        );
        let mut query = vec![("limit", limit.to_string()), ("page", page.to_string())];

        query.extend(
            EXPANSIONS
                .iter()
                .map(|expansion| ("expand[]", expansion.to_string())),
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.credentials.api_key().expose_secret())
            .query(&query)
            .send()
            .await
            .map_err(PublicationClientError::Transport)?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(PublicationClientError::Transport)?;

        match status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(PublicationClientError::Auth),
            StatusCode::NOT_FOUND => return Err(PublicationClientError::NotFound),
            status => {
                let message = extract_error_message(&body);

                tracing::error!("Publication API answered {}: {}", status, message);

                return Err(PublicationClientError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        let raw_page: RawSubscriberPage = serde_json::from_str(&body).map_err(|err| {
            tracing::error!("Failed to decode subscribers page: {:?}", err);

            PublicationClientError::Api {
                status: status.as_u16(),
                message: String::from("Invalid response format."),
            }
        })?;

        Ok(raw_page.into_page(page, limit))
    }

    /// Walks the subscriber list page by page until upstream returns an empty page.
    #[tracing::instrument(
        name = "Fetching all subscribers",
        skip(self),
        fields(publication_id = %self.credentials.publication_id())
    )]
    pub async fn fetch_all(&self) -> Result<Vec<Subscriber>, PublicationClientError> {
        let mut subscribers = Vec::new();

        for page in 1..=self.max_pages {
            let subscriber_page = self.fetch_page(page, MAX_PAGE_SIZE).await?;

            if subscriber_page.data.is_empty() {
                tracing::info!(
                    "Fetched {} subscribers in {} pages",
                    subscribers.len(),
                    page - 1
                );

                return Ok(subscribers);
            }

            subscribers.extend(subscriber_page.data);
        }

        tracing::error!(
            "Subscriber list did not end after {} pages",
            self.max_pages
        );

        Err(PublicationClientError::PaginationLimitExceeded(
            self.max_pages,
        ))
    }

    /// Succeeds only when the stored credentials can read the first page of subscribers.
    #[tracing::instrument(
        name = "Testing the publication API credentials",
        skip(self),
        fields(publication_id = %self.credentials.publication_id())
    )]
    pub async fn test_connection(&self) -> Result<(), PublicationClientError> {
        self.fetch_page(1, CONNECTION_TEST_PAGE_SIZE).await?;

        Ok(())
    }
}

fn extract_error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("message")
                .and_then(|message| message.as_str())
                .or_else(|| {
                    json.get("errors")
                        .and_then(|errors| errors.get(0))
                        .and_then(|error| error.get("message"))
                        .and_then(|message| message.as_str())
                })
                .map(String::from)
        });

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => String::from(GENERIC_ERROR_MESSAGE),
    }
}

#[derive(Deserialize)]
struct RawSubscriberPage {
    data: Vec<RawSubscriber>,
    total: Option<u64>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl RawSubscriberPage {
    fn into_page(self, requested_page: u32, requested_limit: u32) -> SubscriberPage {
        let data: Vec<Subscriber> = self.data.into_iter().map(Subscriber::from).collect();

        SubscriberPage {
            total: self.total.unwrap_or(data.len() as u64),
            page: self.page.unwrap_or(requested_page),
            limit: self.limit.unwrap_or(requested_limit),
            data,
        }
    }
}

#[derive(Deserialize)]
struct RawSubscriber {
    #[serde(default)]
    id: String,
    #[serde(default)]
    email: String,
    status: Option<SubscriberStatus>,
    created_at: Option<RawTimestamp>,
    created: Option<RawTimestamp>,
    updated_at: Option<RawTimestamp>,
    updated: Option<RawTimestamp>,
    stats: Option<RawStats>,
    utm_source: Option<String>,
    utm_medium: Option<String>,
    utm_channel: Option<String>,
    utm_campaign: Option<String>,
    referring_site: Option<String>,
}

/// Upstream sends either formatted strings or Unix epoch seconds.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Epoch(i64),
}

impl RawTimestamp {
    fn normalize(self) -> Option<String> {
        match self {
            RawTimestamp::Text(text) => Some(text),
            RawTimestamp::Epoch(seconds) => Utc
                .timestamp_opt(seconds, 0)
                .single()
                .map(|datetime| datetime.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        }
    }
}

// Counts may arrive as `3.0`
#[derive(Deserialize, Default)]
struct RawStats {
    #[serde(default, alias = "emails_received")]
    total_received: Option<f64>,
    #[serde(default)]
    open_rate: Option<f64>,
    #[serde(default, alias = "click_through_rate")]
    click_rate: Option<f64>,
    #[serde(default)]
    total_clicked: Option<f64>,
    #[serde(default)]
    total_unique_clicked: Option<f64>,
}

fn count(value: Option<f64>) -> u64 {
    value.unwrap_or(0.0).max(0.0) as u64
}

impl From<RawStats> for SubscriberStats {
    fn from(raw: RawStats) -> Self {
        SubscriberStats {
            total_received: count(raw.total_received),
            open_rate: raw.open_rate.unwrap_or(0.0),
            click_rate: raw.click_rate.unwrap_or(0.0),
            total_clicked: count(raw.total_clicked),
            total_unique_clicked: count(raw.total_unique_clicked),
        }
    }
}

impl From<RawSubscriber> for Subscriber {
    fn from(raw: RawSubscriber) -> Self {
        Subscriber {
            id: raw.id,
            email: raw.email,
            status: raw.status.unwrap_or(SubscriberStatus::Unknown),
            created_at: raw.created_at.or(raw.created).and_then(RawTimestamp::normalize),
            updated_at: raw.updated_at.or(raw.updated).and_then(RawTimestamp::normalize),
            stats: raw.stats.unwrap_or_default().into(),
            utm_source: raw.utm_source,
            utm_medium: raw.utm_medium,
            utm_channel: raw.utm_channel,
            utm_campaign: raw.utm_campaign,
            referring_site: raw.referring_site,
            days_to_unsubscribe: None,
        }
    }
}
