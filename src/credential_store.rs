use actix_web::error::BlockingError;
use actix_web::web;
use secrecy::ExposeSecret;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::credentials::Credentials;

#[derive(thiserror::Error, Debug)]
pub enum CredentialStoreError {
    #[error("API configuration not found. Please configure your API credentials first.")]
    Missing,
    #[error("Stored API configuration is invalid: {0}")]
    Invalid(String),
    #[error("Failed to access the credential store.")]
    Io(#[from] io::Error),
    #[error("Failed to access the credential store.")]
    Unavailable(#[from] BlockingError),
}

/// Holds the single active credential set.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Credentials, CredentialStoreError>;

    /// Replaces any previously stored credentials. Readers never observe a partial write.
    fn put(&self, credentials: &Credentials) -> Result<(), CredentialStoreError>;
}

/// Reads the stored credentials on the blocking thread pool, off the async workers.
pub async fn load_credentials(
    store: &web::Data<dyn CredentialStore>,
) -> Result<Credentials, CredentialStoreError> {
    let store = store.clone();

    web::block(move || store.get()).await?
}

/// Replaces the stored credentials on the blocking thread pool.
pub async fn save_credentials(
    store: &web::Data<dyn CredentialStore>,
    credentials: Credentials,
) -> Result<(), CredentialStoreError> {
    let store = store.clone();

    web::block(move || store.put(&credentials)).await?
}

#[derive(serde::Serialize, serde::Deserialize)]
struct StoredCredentials {
    api_key: String,
    publication_id: String,
}

/// JSON file backend: `{"api_key": ..., "publication_id": ...}`.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: PathBuf) -> FileCredentialStore {
        FileCredentialStore { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temporary_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| String::from("credentials"));

        self.path
            .with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }
}

impl CredentialStore for FileCredentialStore {
    #[tracing::instrument(
        name = "Reading stored credentials",
        skip(self),
        fields(path = %self.path.display())
    )]
    fn get(&self) -> Result<Credentials, CredentialStoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(CredentialStoreError::Missing)
            }
            Err(err) => return Err(CredentialStoreError::Io(err)),
        };

        let stored: StoredCredentials = serde_json::from_str(&content)
            .map_err(|err| CredentialStoreError::Invalid(err.to_string()))?;

        Credentials::parse(stored.api_key, stored.publication_id)
            .map_err(CredentialStoreError::Invalid)
    }

    #[tracing::instrument(
        name = "Persisting credentials",
        skip(self, credentials),
        fields(path = %self.path.display())
    )]
    fn put(&self, credentials: &Credentials) -> Result<(), CredentialStoreError> {
        let stored = StoredCredentials {
            api_key: credentials.api_key().expose_secret().clone(),
            publication_id: credentials.publication_id().to_string(),
        };
        let content = serde_json::to_string(&stored)
            .map_err(|err| CredentialStoreError::Invalid(err.to_string()))?;
        let temporary_path = self.temporary_path();

        if let Some(parent) = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(&temporary_path, content)?;

        // Same directory as the target, so rename replaces it atomically
        if let Err(err) = fs::rename(&temporary_path, &self.path) {
            let _ = fs::remove_file(&temporary_path);
            return Err(CredentialStoreError::Io(err));
        }

        Ok(())
    }
}

/// Keeps the credentials in process memory.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<Option<Credentials>>,
}

impl InMemoryCredentialStore {
    pub fn new(credentials: Option<Credentials>) -> InMemoryCredentialStore {
        InMemoryCredentialStore {
            credentials: RwLock::new(credentials),
        }
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self) -> Result<Credentials, CredentialStoreError> {
        let credentials = self.credentials.read().map_err(|_| poisoned())?;

        credentials.clone().ok_or(CredentialStoreError::Missing)
    }

    fn put(&self, credentials: &Credentials) -> Result<(), CredentialStoreError> {
        let mut stored = self.credentials.write().map_err(|_| poisoned())?;

        *stored = Some(credentials.clone());

        Ok(())
    }
}

fn poisoned() -> CredentialStoreError {
    CredentialStoreError::Invalid(String::from("credential lock poisoned"))
}
