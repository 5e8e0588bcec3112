//! HTTP front end for the waterlogging-risk predictor.
//!
//! ```text
//!   POST /predict ──► FeatureInput ──► validate ──► PredictionService ──► JSON
//!   GET  /        ──► status message
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use waterlog_core::{load_classifier, ClassifierError, OverrideRule, PredictionService};

pub use config::ServerConfig;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: PredictionService,
    pub config: ServerConfig,
}

impl AppState {
    /// Load the configured model artifact and build the service around it.
    /// Fails when the artifact is missing, unreadable or invalid.
    pub fn load(config: ServerConfig) -> Result<Self, ClassifierError> {
        let classifier = load_classifier(&config.model_path)?;
        let service = PredictionService::new(classifier).with_override(OverrideRule {
            min_rainfall_7d: config.override_min_rainfall_7d,
        });
        Ok(Self { service, config })
    }
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/", get(handlers::root::status))
        .route("/predict", post(handlers::predict::predict))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let list: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(origin = %o, "skipping invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
