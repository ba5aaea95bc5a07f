//! Application state and route table.

use std::sync::Arc;
use std::time::Duration;

use actix_web::{HttpResponse, web};
use netcheck_toolbox::{LookupOptions, PortChecker};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::gateway::{DefaultLookupGateway, LookupGateway};
use crate::handlers;

/// Everything a handler needs, built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub port_checker: PortChecker,
    pub lookup: Arc<dyn LookupGateway>,
    pub lookup_options: LookupOptions,
    /// Upper bound for a whole `/lookup` request.
    pub lookup_timeout: Duration,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            port_checker: PortChecker::system(config.port_check_config(), config.resolve_timeout()),
            lookup: Arc::new(DefaultLookupGateway),
            lookup_options: config.lookup_options(),
            lookup_timeout: config.lookup_timeout(),
        }
    }
}

/// Mount the service under `prefix` (empty for the root).
pub fn configure(cfg: &mut web::ServiceConfig, state: AppState, prefix: &str) {
    cfg.app_data(web::Data::new(state))
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
        )
        .service(
            web::scope(prefix)
                .route("/portcheck", web::get().to(handlers::port_check))
                .route("/lookup", web::get().to(handlers::lookup))
                .route("/health", web::get().to(handlers::health)),
        )
        .default_service(web::to(|| async {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "not found" }))
        }));
}
