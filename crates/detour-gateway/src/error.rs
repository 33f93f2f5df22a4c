use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use detour_admin::{FlashMessage, Severity};
use detour_core::StorageError;
use serde::Serialize;
use tracing::warn;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("malformed request: {0}")]
    Malformed(String),
    #[error("csrf token does not match")]
    CsrfMismatch,
    /// An admin failure that was already translated for the user.
    #[error("{}", .0.title)]
    Failed(FlashMessage),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    messages: Vec<FlashMessage>,
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Malformed(_) => StatusCode::BAD_REQUEST,
            AppError::CsrfMismatch => StatusCode::FORBIDDEN,
            AppError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(StorageError::Unavailable(_) | StorageError::Timeout(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(error = %self, status = status.as_u16(), "request failed");
        }

        let message = match self {
            AppError::Failed(message) => message,
            other => FlashMessage::new(Severity::Error, other.to_string(), ""),
        };
        let body = ErrorBody {
            success: false,
            messages: vec![message],
        };
        (status, Json(body)).into_response()
    }
}
