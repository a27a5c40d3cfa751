use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::notify::Severity;

pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the identity, lifecycle and reputation operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Please login to continue")]
    NotAuthenticated,

    #[error("Only authority accounts can do this")]
    NotAuthorized,

    #[error("Invalid input: {0}")]
    ValidationFailed(String),

    #[error("User with this email or phone already exists")]
    DuplicateIdentity,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Issue not found")]
    NotFound,

    #[error("You have already voted on this issue")]
    AlreadyVoted,

    #[error("Cannot move issue from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotAuthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotAuthorized => StatusCode::FORBIDDEN,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateIdentity | Self::AlreadyVoted | Self::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::DuplicateIdentity => "DUPLICATE_IDENTITY",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyVoted => "ALREADY_VOTED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    /// Severity the glue layer should render this failure with.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::NotAuthenticated | Self::ValidationFailed(_) | Self::AlreadyVoted => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::debug!(error = %self, code, "request rejected");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
                "severity": self.severity(),
            }
        }));
        (status, body).into_response()
    }
}

/// Error type of the HTTP handlers: a core failure, or something internal
/// such as token signing.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    Internal(anyhow::Error),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Core(e) => e.into_response(),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                let body = Json(json!({
                    "error": {
                        "code": "INTERNAL_ERROR",
                        "message": "internal error",
                        "severity": Severity::Error,
                    }
                }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(CoreError::NotAuthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(CoreError::NotAuthorized.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(CoreError::AlreadyVoted.status_code(), StatusCode::CONFLICT);
        assert_eq!(CoreError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            CoreError::validation("description is required").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_failure_is_the_only_server_error() {
        let err = CoreError::StorageUnavailable("disk full".into());
        assert!(err.status_code().is_server_error());
        assert_eq!(err.severity(), Severity::Error);
        assert_eq!(CoreError::AlreadyVoted.severity(), Severity::Warning);
    }
}
