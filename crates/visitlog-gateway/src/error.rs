use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use visitlog_core::{CoreError, StoreError};

pub type Result<T> = std::result::Result<T, AppError>;

/// Errors surfaced to HTTP clients.
///
/// The message doubles as the `status` field of the response body, e.g.
/// `{"status": "BadRequest (missing query parameter 'to')"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("BadRequest ({0})")]
    BadRequest(String),
    #[error("ServiceUnavailable ({0})")]
    StoreUnavailable(#[from] StoreError),
}

impl From<CoreError> for AppError {
    fn from(error: CoreError) -> Self {
        AppError::BadRequest(error.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    status: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = match &self {
            AppError::BadRequest(reason) => {
                debug!(%reason, "rejected request");
                StatusCode::BAD_REQUEST
            }
            AppError::StoreUnavailable(source) => {
                error!(error = %source, "domain store unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
        };

        (
            code,
            Json(ErrorBody {
                status: self.to_string(),
            }),
        )
            .into_response()
    }
}
