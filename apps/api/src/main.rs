mod config;
mod db;
mod documents;
mod errors;
mod llm_client;
mod models;
mod retry;
mod routes;
mod screening;
mod state;
mod storage;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{apply_schema, create_pool};
use crate::documents::DocumentExtractor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::extractor::Vocabulary;
use crate::screening::pipeline::{Screener, ScreeningSettings};
use crate::state::AppState;
use crate::storage::{CandidateStore, PgCandidateStore, S3BlobStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    apply_schema(&db).await?;
    let store: Arc<dyn CandidateStore> = Arc::new(PgCandidateStore::new(db));

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (region: {})", config.aws_region);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_timeout)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let vocabulary = match &config.skill_vocabulary {
        Some(terms) => Vocabulary::new(terms)?,
        None => Vocabulary::default_technical()?,
    };
    info!("Skill vocabulary loaded ({} terms)", vocabulary.len());

    let screener = Screener::new(
        Arc::new(llm),
        Arc::new(DocumentExtractor),
        Arc::new(S3BlobStore::new(s3, config.blob_timeout)),
        store.clone(),
        Arc::new(vocabulary),
        ScreeningSettings {
            admission_threshold: config.admission_threshold,
            concurrency: config.batch_concurrency,
        },
    );
    info!(
        "Screening settings: admission threshold {}, batch concurrency {}",
        config.admission_threshold, config.batch_concurrency
    );

    // Build app state
    let state = AppState {
        screener: Arc::new(screener),
        store,
        max_upload_bytes: config.max_upload_bytes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client for AWS, or for MinIO when `S3_ENDPOINT` is set.
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "screener-static",
    );

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(credentials);
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let s3_config = loader.load().await;

    aws_sdk_s3::Client::new(&s3_config)
}
