use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::config::PublicationApiSettings;
use crate::credential_store::{load_credentials, CredentialStore, CredentialStoreError};
use crate::metrics::{annotate_days_to_unsubscribe, compute_metrics};
use crate::publication_client::{PublicationClient, PublicationClientError};
use crate::routes::{error_chain_fmt, MessageBody};

#[tracing::instrument(name = "Fetching subscriber metrics", skip(credential_store, settings))]
pub async fn get_subscribers(
    credential_store: web::Data<dyn CredentialStore>,
    settings: web::Data<PublicationApiSettings>,
) -> Result<HttpResponse, SubscribersError> {
    let credentials = load_credentials(&credential_store).await?;
    let publication_client = PublicationClient::from_settings(&settings, credentials)?;
    let subscribers = publication_client.fetch_all().await?;

    if subscribers.is_empty() {
        return Err(SubscribersError::NoSubscribers);
    }

    let mut summary = compute_metrics(subscribers);

    annotate_days_to_unsubscribe(&mut summary.subscribers);

    tracing::info!(
        total_subscribers = summary.total_subscribers,
        percent_clicked_once = summary.percent_clicked_once,
        "Computed subscriber metrics"
    );

    Ok(HttpResponse::Ok().json(summary))
}

#[derive(thiserror::Error)]
pub enum SubscribersError {
    #[error(transparent)]
    CredentialStore(#[from] CredentialStoreError),
    #[error(transparent)]
    PublicationApi(#[from] PublicationClientError),
    #[error("No subscribers found.")]
    NoSubscribers,
}

impl std::fmt::Debug for SubscribersError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribersError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribersError::CredentialStore(
                CredentialStoreError::Io(_) | CredentialStoreError::Unavailable(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            SubscribersError::CredentialStore(_) => StatusCode::BAD_REQUEST,
            // Stored credentials were rejected upstream
            SubscribersError::PublicationApi(PublicationClientError::Auth) => {
                StatusCode::BAD_REQUEST
            }
            SubscribersError::PublicationApi(PublicationClientError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            SubscribersError::PublicationApi(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SubscribersError::NoSubscribers => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageBody::new(self.to_string()))
    }
}
