//! Biosensor Registry API Server
//!
//! REST API over the component catalog, combination synthesis, analytics
//! and table export.

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use data_validator::Validator;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use storage::{MemoryRepository, Repository, SqliteRepository};
use synthesis::SynthesisService;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod rate_limit;
mod routes;

pub use crate::config::Settings;
use crate::config::{LoggingSettings, StorageSettings};
pub use crate::error::{ApiError, ApiResult};

use crate::rate_limit::{create_governor_config, rate_limited_as_json};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Storage repository
    pub repository: Arc<dyn Repository>,
    /// Entry validation
    pub validator: Arc<Validator>,
    /// Serialized synthesis and manual entry
    pub synthesis: Arc<SynthesisService>,
    pub settings: Arc<Settings>,
    /// Prometheus renderer, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(repository: Arc<dyn Repository>, settings: Settings) -> Self {
        let synthesis = SynthesisService::new(repository.clone(), settings.synthesis.service_config());
        Self {
            repository,
            validator: Arc::new(Validator::default()),
            synthesis: Arc::new(synthesis),
            settings: Arc::new(settings),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Seconds since start
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let mut synthesize: Router<AppState> =
        Router::new().route("/combinations/synthesize", post(routes::combinations::synthesize));
    match create_governor_config(&state.settings.rate_limit) {
        Some(config) => {
            synthesize = synthesize
                .layer(GovernorLayer { config })
                .layer(middleware::map_response(rate_limited_as_json))
        }
        None => info!("Rate limiting disabled for synthesis"),
    }

    let api = Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/analytes",
            get(routes::components::list_analytes).post(routes::components::create_analyte),
        )
        .route(
            "/bio-recognition",
            get(routes::components::list_bio_recognition)
                .post(routes::components::create_bio_recognition),
        )
        .route(
            "/immobilization",
            get(routes::components::list_immobilization)
                .post(routes::components::create_immobilization),
        )
        .route(
            "/memristive",
            get(routes::components::list_memristive).post(routes::components::create_memristive),
        )
        .route("/passports", post(routes::passports::create_passport))
        .route(
            "/combinations",
            get(routes::combinations::list_combinations)
                .post(routes::combinations::create_combination),
        )
        .merge(synthesize)
        .route("/analytics/statistics", get(routes::analytics::statistics))
        .route("/analytics/best-combinations", get(routes::analytics::best_combinations))
        .route("/analytics/comparative", get(routes::analytics::comparative))
        .route("/export/:table", get(routes::export::export_table));

    let cors = cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(routes::health::render_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Initialize logging from settings. Call once per process.
pub fn init_logging(settings: &LoggingSettings) -> anyhow::Result<()> {
    let level = Level::from_str(&settings.level)
        .map_err(|_| anyhow::anyhow!("Invalid log level '{}'", settings.level))?;

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Install the global Prometheus recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Open the configured repository: SQLite when a URL is set, memory otherwise
pub async fn open_repository(settings: &StorageSettings) -> anyhow::Result<Arc<dyn Repository>> {
    match &settings.database_url {
        Some(url) => {
            let repo = SqliteRepository::connect(url, settings.max_connections).await?;
            Ok(Arc::new(repo))
        }
        None => {
            warn!("No database_url configured; records will not survive a restart");
            Ok(Arc::new(MemoryRepository::new()))
        }
    }
}

/// Serve the router on a bound listener. Peer addresses are attached to
/// each request so the rate limiter can key on them.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> anyhow::Result<()> {
    let app = create_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Run the server until it fails or is stopped
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.settings.server.listen_addr;
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, state).await
}
