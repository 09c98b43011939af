use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::config::PublicationApiSettings;
use crate::credential_store::{save_credentials, CredentialStore, CredentialStoreError};
use crate::domain::credentials::{Credentials, CredentialsBody};
use crate::publication_client::{PublicationClient, PublicationClientError};
use crate::routes::{error_chain_fmt, MessageBody};

/// Validates the submitted credentials against the publication API and, only when they
/// work, replaces the stored ones. A failed attempt leaves the store untouched.
#[tracing::instrument(
    name = "Saving the publication API configuration",
    skip(body, credential_store, settings)
)]
pub async fn save_configuration(
    body: web::Json<CredentialsBody>,
    credential_store: web::Data<dyn CredentialStore>,
    settings: web::Data<PublicationApiSettings>,
) -> Result<HttpResponse, ConfigurationError> {
    let credentials: Credentials = body.try_into().map_err(ConfigurationError::Validation)?;

    validate_credentials(&settings, credentials.clone()).await?;

    save_credentials(&credential_store, credentials.clone()).await?;

    tracing::info!(
        "Configuration saved for publication {}",
        credentials.publication_id()
    );

    Ok(HttpResponse::Ok().json(MessageBody::new("Configuration saved successfully")))
}

#[tracing::instrument(
    name = "Validating credentials against the publication API",
    skip(settings, credentials),
    fields(publication_id = %credentials.publication_id())
)]
async fn validate_credentials(
    settings: &PublicationApiSettings,
    credentials: Credentials,
) -> Result<(), ConfigurationError> {
    let publication_client = PublicationClient::from_settings(settings, credentials)?;

    publication_client.test_connection().await?;

    Ok(())
}

#[derive(thiserror::Error)]
pub enum ConfigurationError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid API key or unauthorized access.")]
    InvalidCredentials(#[source] PublicationClientError),
    #[error("Publication not found. Please verify your publication ID.")]
    PublicationNotFound,
    #[error("Failed to set up the publication API client.")]
    ClientSetup(#[source] PublicationClientError),
    #[error("Failed to save the configuration.")]
    CredentialStore(#[from] CredentialStoreError),
}

impl From<PublicationClientError> for ConfigurationError {
    fn from(err: PublicationClientError) -> Self {
        match err {
            PublicationClientError::NotFound => ConfigurationError::PublicationNotFound,
            // Our own client failed to build, the submitted credentials were never tried
            PublicationClientError::Setup(_) => ConfigurationError::ClientSetup(err),
            err => ConfigurationError::InvalidCredentials(err),
        }
    }
}

impl std::fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for ConfigurationError {
    fn status_code(&self) -> StatusCode {
        match self {
            ConfigurationError::Validation(_) => StatusCode::BAD_REQUEST,
            ConfigurationError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            ConfigurationError::PublicationNotFound => StatusCode::NOT_FOUND,
            ConfigurationError::ClientSetup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ConfigurationError::CredentialStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(MessageBody::new(self.to_string()))
    }
}
