use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::auth::models::AuthError;
use crate::errors::{AuthErrorType, Error};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// Rejected credentials or input; rendered as a plain-text body.
    Unprocessable(String),
    Unauthorized(String),
    Conflict(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        ApiError::ServiceUnavailable(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let (error_kind, message) = match self {
            ApiError::Unprocessable(message) => return (status, message).into_response(),
            ApiError::BadRequest(msg) => ("bad_request", msg),
            ApiError::Unauthorized(msg) => ("unauthorized", msg),
            ApiError::Conflict(msg) => ("conflict", msg),
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg),
            ApiError::Internal(msg) => ("internal_error", msg),
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { message, .. } => ApiError::Unprocessable(message),
            Error::Auth { message, error_type } => match error_type {
                AuthErrorType::UserNotFound | AuthErrorType::PasswordMismatch => {
                    ApiError::Unprocessable(message)
                }
                AuthErrorType::MalformedToken | AuthErrorType::TokenNotFound => {
                    ApiError::Unauthorized(format!("Unauthorized: {message}"))
                }
            },
            Error::Conflict { message, .. } => ApiError::Conflict(message),
            Error::Database { source, context } => {
                tracing::error!(error = %source, %context, "storage failure");
                ApiError::ServiceUnavailable(context)
            }
            other @ (Error::Config { .. }
            | Error::Migration { .. }
            | Error::Io { .. }
            | Error::Internal { .. }) => {
                tracing::error!(error = %other, "internal failure");
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingBearer => {
                ApiError::Unauthorized("Unauthorized: missing bearer token".to_string())
            }
            AuthError::MalformedBearer => {
                ApiError::Unauthorized("Unauthorized: malformed bearer token".to_string())
            }
            AuthError::TokenNotFound => {
                ApiError::Unauthorized("Unauthorized: token not found".to_string())
            }
            AuthError::InactiveToken => {
                ApiError::Unauthorized("Unauthorized: token is inactive".to_string())
            }
            AuthError::ExpiredToken => {
                ApiError::Unauthorized("Unauthorized: token has expired".to_string())
            }
            AuthError::Persistence(err) => ApiError::from(err),
        }
    }
}
