pub mod config;
pub mod credential_store;
pub mod domain;
pub mod metrics;
pub mod publication_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
