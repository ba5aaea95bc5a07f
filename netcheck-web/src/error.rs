//! HTTP error mapping.

use std::time::Duration;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use netcheck_toolbox::ToolboxError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed caller input.
    #[error("{0}")]
    Validation(String),

    /// An upstream service (DNS, WHOIS, HTTP) failed as a whole.
    #[error("{0}")]
    Network(String),

    #[error("{operation} timed out after {}s", .limit.as_secs())]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },
}

impl ApiError {
    const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Network(_) => "NetworkError",
            Self::Timeout { .. } => "Timeout",
        }
    }
}

impl From<ToolboxError> for ApiError {
    fn from(err: ToolboxError) -> Self {
        match err {
            ToolboxError::ValidationError(msg) => Self::Validation(msg),
            ToolboxError::NetworkError(msg) => Self::Network(msg),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    code: &'a str,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_client_error() {
            tracing::warn!(code = self.code(), "{self}");
        } else {
            tracing::error!(code = self.code(), "{self}");
        }
        HttpResponse::build(status).json(ErrorBody {
            error: self.to_string(),
            code: self.code(),
        })
    }
}
