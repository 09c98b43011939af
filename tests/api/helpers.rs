use reqwest::Response;
use std::path::PathBuf;
use uuid::Uuid;
use wiremock::MockServer;

use subscriber_metrics::{
    config::{get_configuration, Settings},
    credential_store::{CredentialStore, CredentialStoreError, FileCredentialStore},
    domain::credentials::Credentials,
    startup::Application,
};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_PUBLICATION_ID: &str = "pub_123";

pub struct TestApp {
    pub config: Settings,
    pub address: String,
    pub publication_server: MockServer,
    pub credential_store: FileCredentialStore,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        let mut config = get_configuration().expect("Missing configuration file.");
        let publication_server = MockServer::start().await;
        // Each test gets its own directory so that credential files never collide
        let credential_store_path: PathBuf = std::env::temp_dir()
            .join(format!("subscriber-metrics-{}", Uuid::new_v4()))
            .join("config.json");

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        config.set_publication_api_base_url(publication_server.uri());
        config.set_credential_store_path(credential_store_path.clone());

        let application = Application::build(config.clone())
            .await
            .expect("Failed to build application.");

        let address = format!("http://127.0.0.1:{}", application.get_port());

        tokio::spawn(application.run_until_stop());

        TestApp {
            address,
            config,
            publication_server,
            credential_store: FileCredentialStore::new(credential_store_path),
        }
    }

    /// Spawns the app with valid credentials already stored.
    pub async fn spawn_configured_app() -> TestApp {
        let test_app = Self::spawn_app().await;

        test_app.store_credentials(TEST_API_KEY, TEST_PUBLICATION_ID);

        test_app
    }

    pub fn store_credentials(&self, api_key: &str, publication_id: &str) {
        let credentials = Credentials::parse(api_key.to_string(), publication_id.to_string())
            .expect("Invalid test credentials.");

        self.credential_store
            .put(&credentials)
            .expect("Failed to store test credentials.");
    }

    pub fn stored_credentials(&self) -> Result<Credentials, CredentialStoreError> {
        self.credential_store.get()
    }

    pub async fn get_subscribers(&self) -> Response {
        let client = reqwest::Client::new();

        client
            .get(format!("{}/api/subscribers/", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_config(&self, body: serde_json::Value) -> Response {
        let client = reqwest::Client::new();

        client
            .post(format!("{}/api/config", self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_cors_check(&self) -> Response {
        let client = reqwest::Client::new();

        client
            .get(format!("{}/api/cors-check/", self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn subscriber_json(id: &str, status: &str, total_unique_clicked: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": format!("{}@example.com", id),
        "status": status,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-05T00:00:00Z",
        "stats": {
            "total_received": 10,
            "open_rate": 0.4,
            "click_rate": 0.1,
            "total_clicked": total_unique_clicked,
            "total_unique_clicked": total_unique_clicked
        }
    })
}

pub fn page_json(subscribers: Vec<serde_json::Value>, page: u32, total: u64) -> serde_json::Value {
    serde_json::json!({
        "data": subscribers,
        "total": total,
        "page": page,
        "limit": 1000
    })
}
