//! Request handlers.
//!
//! Query parameters are taken as optional strings so that missing or
//! malformed values reach the toolbox validation and produce its messages.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tokio::time::timeout;
use tracing_attributes::instrument;

use crate::error::ApiError;
use crate::middleware::RequestId;
use crate::routes::AppState;

#[derive(Debug, Deserialize)]
pub struct PortCheckQuery {
    pub host: Option<String>,
    pub port: Option<String>,
    pub timeout: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub domain: Option<String>,
}

/// `GET /portcheck?host=&port=&timeout=`
#[instrument(
    skip_all,
    fields(request_id = %RequestId::of(&req), host = ?query.host, port = ?query.port)
)]
pub async fn port_check(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<PortCheckQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let result = state
        .port_checker
        .check(
            query.host.as_deref().unwrap_or_default(),
            query.port.as_deref().unwrap_or_default(),
            query.timeout.as_deref(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(result))
}

/// `GET /lookup?domain=`
#[instrument(
    skip_all,
    fields(request_id = %RequestId::of(&req), domain = ?query.domain)
)]
pub async fn lookup(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<LookupQuery>,
) -> Result<HttpResponse, ApiError> {
    let domain = query.domain.as_deref().unwrap_or_default();
    let report = timeout(
        state.lookup_timeout,
        state.lookup.domain_lookup(domain, &state.lookup_options),
    )
    .await
    .map_err(|_| ApiError::Timeout {
        operation: "Domain lookup",
        limit: state.lookup_timeout,
    })??;
    Ok(HttpResponse::Ok().json(report))
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
