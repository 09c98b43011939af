use actix_web::dev::Server;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::config::{PublicationApiSettings, Settings};
use crate::credential_store::{CredentialStore, FileCredentialStore};
use crate::routes::{cors_check, get_subscribers, save_configuration, MessageBody};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    /// Builds the server with the file backed credential store from `config`.
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let credential_store = Arc::new(FileCredentialStore::new(
            config.get_credential_store_path(),
        ));

        Self::build_with_store(config, credential_store).await
    }

    pub async fn build_with_store(
        config: Settings,
        credential_store: Arc<dyn CredentialStore>,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(listener, credential_store, config.get_publication_api())?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    credential_store: Arc<dyn CredentialStore>,
    publication_api: PublicationApiSettings,
) -> Result<Server, std::io::Error> {
    let credential_store: web::Data<dyn CredentialStore> = web::Data::from(credential_store);
    let publication_api = web::Data::new(publication_api);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/api/subscribers/", web::get().to(get_subscribers))
            .route("/api/config", web::post().to(save_configuration))
            .route("/api/cors-check/", web::get().to(cors_check))
            .app_data(json_config())
            .app_data(credential_store.clone())
            .app_data(publication_api.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

// Malformed request bodies get the same `{message}` shape as every other error
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _request| {
        tracing::error!("Invalid JSON body: {}", err);

        let response = HttpResponse::BadRequest().json(MessageBody::new(err.to_string()));

        InternalError::from_response(err, response).into()
    })
}
