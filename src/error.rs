//! Service error taxonomy and the uniform HTTP envelope.
//!
//! Every failure surfaced to a client carries a stable machine-readable
//! `code` alongside the human-readable message, so callers branch on the
//! code instead of string-matching.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid identifier format: {value}")]
    InvalidId { value: String },

    /// Field-level validation failure with its own stable code
    /// (MISSING_RATING, COMMENT_TOO_SHORT, ...).
    #[error("{message}")]
    Validation {
        code: &'static str,
        message: String,
    },

    #[error("authentication required")]
    AuthFailed,

    #[error("product not found")]
    ProductNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("type not found or inactive")]
    TypeNotFound,

    #[error("product is not active")]
    ProductInactive,

    #[error("product id in body does not match the request path")]
    ProductIdMismatch,

    #[error("database unavailable")]
    DbConnection(#[source] sqlx::Error),

    #[error("operation timed out: {operation}")]
    Timeout { operation: &'static str },

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidId { .. } => "INVALID_ID",
            Self::Validation { code, .. } => code,
            Self::AuthFailed => "AUTH_FAILED",
            Self::ProductNotFound => "PRODUCT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::TypeNotFound => "TYPE_NOT_FOUND",
            Self::ProductInactive => "PRODUCT_INACTIVE",
            Self::ProductIdMismatch => "PRODUCT_ID_MISMATCH",
            Self::DbConnection(_) => "DB_CONNECTION_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId { .. }
            | Self::Validation { .. }
            | Self::ProductInactive
            | Self::ProductIdMismatch => StatusCode::BAD_REQUEST,
            Self::AuthFailed => StatusCode::UNAUTHORIZED,
            Self::ProductNotFound | Self::UserNotFound | Self::TypeNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::DbConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-resolvable failures are never logged or alerted on.
    fn is_client_fault(&self) -> bool {
        !matches!(
            self,
            Self::DbConnection(_) | Self::Timeout { .. } | Self::Internal(_)
        )
    }

    fn client_message(&self) -> String {
        match self {
            // Generic message in release builds; the source chain is only
            // attached where an operator can see the logs anyway.
            Self::Internal(source) if cfg!(debug_assertions) => format!("internal error: {source:#}"),
            Self::DbConnection(source) if cfg!(debug_assertions) => {
                format!("database unavailable: {source}")
            }
            Self::Internal(_) => "Something went wrong. Please retry later.".to_string(),
            Self::DbConnection(_) => "Service temporarily unavailable. Please retry.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::DbConnection(err)
            }
            other => Self::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if !self.is_client_fault() {
            tracing::error!(code = self.code(), error = ?self, "request failed");
        }
        let body = serde_json::json!({
            "success": false,
            "message": self.client_message(),
            "code": self.code(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ApiError::InvalidId { value: "nope".into() }.code(), "INVALID_ID");
        assert_eq!(ApiError::validation("MISSING_RATING", "rating is required").code(), "MISSING_RATING");
        assert_eq!(ApiError::TypeNotFound.code(), "TYPE_NOT_FOUND");
        assert_eq!(ApiError::Timeout { operation: "list_products" }.code(), "TIMEOUT");
    }

    #[test]
    fn test_status_classes() {
        assert_eq!(ApiError::ProductIdMismatch.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::AuthFailed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::ProductNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Timeout { operation: "x" }.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError::DbConnection(sqlx::Error::PoolClosed).status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_pool_errors_map_to_db_connection() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.code(), "DB_CONNECTION_ERROR");
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_validation_is_client_fault() {
        assert!(ApiError::validation("INVALID_RATING", "x").is_client_fault());
        assert!(!ApiError::Timeout { operation: "x" }.is_client_fault());
    }
}
