use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use std::{sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod aws_clients;
mod config;
mod day_window;
mod domain;
mod errors;
mod handlers;
mod models;
mod repositories;
mod routes;
mod startup;
mod storage;
mod uploads;

#[cfg(test)]
mod test_support;

use crate::config::Config;
use crate::domain::{JournalRepository, MediaStore};
use crate::errors::AppError;
use crate::repositories::DynamoDbJournalRepository;
use crate::storage::S3MediaStore;

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub journal_repo: Arc<dyn JournalRepository>,
    pub media_store: Arc<dyn MediaStore>,
    pub upload_timeout: Duration,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "journal_service=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;

    // --- AWS Client Initialization ---
    let sdk_config = aws_clients::create_sdk_config(&config).await;
    let db_client: DynamoDbClient = aws_clients::create_dynamodb_client(&sdk_config, config.store_timeout);
    let s3_client: S3Client = aws_clients::create_s3_client(&sdk_config);

    startup::init_resources(
        &db_client,
        &s3_client,
        &config.journals_table,
        &config.journal_bucket_name,
        &config.aws_region,
    )
    .await?;

    // --- Application State ---
    let state = Arc::new(AppState {
        journal_repo: Arc::new(DynamoDbJournalRepository::new(db_client, config.journals_table.clone())),
        media_store: Arc::new(S3MediaStore::new(
            s3_client,
            config.journal_bucket_name.clone(),
            config.media_public_base_url.clone(),
        )),
        upload_timeout: config.upload_timeout,
    });

    let app = routes::create_router(state, &config)?;

    tracing::info!("Server listening on http://{}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
