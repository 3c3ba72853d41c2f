//! ECG Twin Cloud Backend Server
//!
//! Encrypted inference endpoint for ECG feature vectors.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      ECG TWIN CLOUD                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────┐  ┌──────────────────────────┐ │
//! │  │  API      │  │  Cipher    │  │  Inference Engine        │ │
//! │  │  Gateway  │  │  Codec     │  │  (ONNX Runtime)          │ │
//! │  │  (Axum)   │  │  (AES-CBC) │  │                          │ │
//! │  └─────┬─────┘  └─────┬──────┘  └────────────┬─────────────┘ │
//! │        └──────────────┼─────────────────────-┘               │
//! │                       ▼                                      │
//! │              ┌─────────────────┐                             │
//! │              │ Append-only log │                             │
//! │              │ (JSONL)         │                             │
//! │              └─────────────────┘                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod crypto;
mod dataset;
mod error;
mod handlers;
mod inference;
mod middleware;
mod models;
mod stats;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::{
    http::header,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::crypto::CipherCodec;
use crate::dataset::ReferenceDataset;
use crate::handlers::artifact::EdgeModelCache;
use crate::inference::InferenceEngine;
use crate::middleware::rate_limit::RateLimiter;
use crate::models::UserTable;
use crate::stats::EventLog;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ecgtwin_cloud=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()
        .expect("Invalid configuration");

    tracing::info!("ECG Twin Cloud Server starting...");

    let users = UserTable::from_json(&config.users_json)
        .expect("Failed to parse USERS_JSON");

    let codec = CipherCodec::new(&config.cipher_key, &config.cipher_iv)
        .expect("Invalid cipher key material");

    // Model, scaler and dataset are startup preconditions: refuse to serve
    // without them rather than failing per request.
    let engine = InferenceEngine::load(
        Path::new(&config.model_path),
        Path::new(&config.scaler_path),
    )
    .expect("Failed to load model and scaler");

    let dataset = ReferenceDataset::load(Path::new(&config.dataset_path))
        .expect("Failed to load reference dataset");
    tracing::info!("Reference dataset loaded ({} rows)", dataset.len());

    let log = EventLog::new(&config.stats_log_path)
        .expect("Failed to open statistics log");

    let edge_model = EdgeModelCache::new(&config.edge_model_path);

    let state = AppState {
        users: Arc::new(users),
        codec,
        engine: Arc::new(engine),
        dataset: Arc::new(dataset),
        log: Arc::new(log),
        edge_model: Arc::new(edge_model),
        predict_limiter: Arc::new(RateLimiter::per_minute(100)),
        download_limiter: Arc::new(RateLimiter::per_minute(50)),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserTable>,
    pub codec: CipherCodec,
    pub engine: Arc<InferenceEngine>,
    pub dataset: Arc<ReferenceDataset>,
    pub log: Arc<EventLog>,
    pub edge_model: Arc<EdgeModelCache>,
    pub predict_limiter: Arc<RateLimiter>,
    pub download_limiter: Arc<RateLimiter>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth, no throttle)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/login", post(handlers::auth::login))
        .route("/samples/random", post(handlers::samples::random_sample))
        .route("/stats/summary", get(handlers::stats::summary));

    // Admin routes: token checked inside the handlers so forbidden vs
    // malformed-token stay distinguishable
    let admin_routes = Router::new()
        .route("/stats/export/csv", get(handlers::stats::export_csv))
        .route("/stats", delete(handlers::stats::clear));

    // Throttled routes
    let predict_routes = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_predict,
        ));

    let download_routes = Router::new()
        .route("/models/tflite/download", get(handlers::artifact::download))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::limit_download,
        ));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(predict_routes)
        .merge(download_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([header::CONTENT_DISPOSITION]),
        )
        .with_state(state)
}
