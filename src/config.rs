use config::{Config, ConfigError, File};
use serde_aux::field_attributes::deserialize_number_from_string;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time;

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub publication_api: PublicationApiSettings,
    pub credential_store: CredentialStoreSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

/// Connection settings for the upstream publication platform. Credentials are not part of
/// them: they live in the credential store and can change while the server is running.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct PublicationApiSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
    // Upper bound on pages fetched per request, in case upstream never returns an empty page.
    // Zero would mean never asking for a single page, so it is rejected at load time.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_pages: NonZeroU32,
}

#[derive(serde::Deserialize, Clone)]
pub struct CredentialStoreSettings {
    pub path: PathBuf,
}

impl Settings {
    pub fn get_address(&self) -> String {
        format!(
            "{}:{}",
            self.application.get_host(),
            self.application.get_port()
        )
    }

    pub fn get_publication_api(&self) -> PublicationApiSettings {
        self.publication_api.clone()
    }

    pub fn set_publication_api_base_url(&mut self, new_base_url: String) {
        self.publication_api.base_url = new_base_url
    }

    pub fn get_credential_store_path(&self) -> PathBuf {
        self.credential_store.path.clone()
    }

    pub fn set_credential_store_path(&mut self, new_path: PathBuf) {
        self.credential_store.path = new_path
    }

    pub fn set_app_port(&mut self, port: u16) {
        self.application.port = port;
    }
}

impl ApplicationSettings {
    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_host(&self) -> String {
        self.host.clone()
    }
}

impl PublicationApiSettings {
    pub fn get_base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn get_max_pages(&self) -> NonZeroU32 {
        self.max_pages
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().map_err(|err| {
        ConfigError::Message(format!(
            "Failed to determine the current directory: {}",
            err
        ))
    })?;
    let config_directory = root_path.join("config");
    // Uses development environment by default
    let enviroment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(enviroment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_PUBLICATION_API__BASE_URL would set Settings.publication_api.base_url
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", enviroment);

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}
