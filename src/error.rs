use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::auth::secrets::CipherError;

/// Failure outcomes surfaced by the API. Every variant maps to a stable
/// status code and a short message; internal faults are logged and
/// reported with a generic body only.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    /// Same wording for unknown username and wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Please verify your email before logging in")]
    Unverified,
    #[error("Authorization header missing")]
    AuthenticationRequired,
    #[error("Refresh token missing")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Refresh token is no longer valid")]
    RevokedToken,
    #[error("{0}")]
    Forbidden(String),
    #[error("stored ciphertext failed authentication")]
    Decryption(#[from] CipherError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials
            | ApiError::Unverified
            | ApiError::AuthenticationRequired
            | ApiError::MissingToken
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::RevokedToken | ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Decryption(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return ApiError::Conflict("Username or email is already in use".into());
            }
        }
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Decryption(err) => {
                error!(error = %err, "email decryption failed");
                "Internal server error".to_string()
            }
            ApiError::Internal(err) => {
                error!(error = %err, "unhandled internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Unverified.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::AuthenticationRequired.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::MissingToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::RevokedToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let response =
            ApiError::Internal(anyhow::anyhow!("secret connection string")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn credential_errors_share_wording() {
        // Unknown-username and wrong-password paths both produce this
        // variant, so the message cannot be used for enumeration.
        assert_eq!(ApiError::InvalidCredentials.to_string(), "Invalid credentials");
    }
}
