use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{dto::ErrorResponse, repository::StoreError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid date format (use YYYY-MM-DD)")]
    InvalidDate,

    #[error("Username taken")]
    UsernameTaken,

    #[error("Invalid username/password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    /// Unexpected database failure; the driver's text is passed to the client.
    #[error("DB error: {0}")]
    Storage(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::InvalidDate | Self::UsernameTaken => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials | Self::Unauthenticated | Self::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
