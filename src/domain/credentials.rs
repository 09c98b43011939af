use actix_web::web;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// The single active credential set used to talk to the publication platform.
#[derive(Clone)]
pub struct Credentials {
    api_key: Secret<String>,
    publication_id: String,
}

impl Credentials {
    pub fn parse(api_key: String, publication_id: String) -> Result<Credentials, String> {
        let api_key = api_key.trim();
        let publication_id = publication_id.trim();

        if api_key.is_empty() || publication_id.is_empty() {
            return Err(String::from("API key and Publication ID are required"));
        }

        Ok(Self {
            api_key: Secret::new(api_key.to_string()),
            publication_id: publication_id.to_string(),
        })
    }

    pub fn api_key(&self) -> &Secret<String> {
        &self.api_key
    }

    pub fn publication_id(&self) -> &str {
        &self.publication_id
    }
}

/// Body of a configuration request. Fields are optional so that a missing field is
/// reported with the same message as a blank one.
#[derive(Deserialize)]
pub struct CredentialsBody {
    #[serde(rename = "apiKey", default)]
    pub api_key: Option<String>,
    #[serde(rename = "publicationId", default)]
    pub publication_id: Option<String>,
}

impl TryFrom<web::Json<CredentialsBody>> for Credentials {
    type Error = String;

    fn try_from(body: web::Json<CredentialsBody>) -> Result<Self, Self::Error> {
        let body = body.into_inner();

        Credentials::parse(
            body.api_key.unwrap_or_default(),
            body.publication_id.unwrap_or_default(),
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("publication_id", &self.publication_id)
            .finish()
    }
}

impl PartialEq for Credentials {
    fn eq(&self, other: &Self) -> bool {
        self.api_key.expose_secret() == other.api_key.expose_secret()
            && self.publication_id == other.publication_id
    }
}
