//! `/login` and `/logout` handlers.

use axum::{
    body::{Body, Bytes},
    extract::{Extension, FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::login_service::LOGOUT_MESSAGE;
use crate::auth::{AuthContext, LoginRequest};
use crate::errors::{AuthErrorType, Error};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Login credentials from either a JSON or a form-urlencoded body.
#[derive(Debug)]
pub struct LoginPayload(pub LoginRequest);

impl<S> FromRequest<S> for LoginPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let content_type = req.headers().get(CONTENT_TYPE).cloned();
        let is_form = content_type
            .as_ref()
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| {
                value.to_ascii_lowercase().starts_with("application/x-www-form-urlencoded")
            });

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        // An empty body means no credentials were sent, whatever the content type.
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(LoginRequest::default()));
        }

        if is_form {
            let mut req = Request::new(Body::from(bytes));
            *req.method_mut() = method;
            if let Some(value) = content_type {
                req.headers_mut().insert(CONTENT_TYPE, value);
            }
            let Form(request) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(Self(request));
        }

        // JSON, or no usable content type.
        let Json(request) = Json::<LoginRequest>::from_bytes(&bytes)
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        Ok(Self(request))
    }
}

pub async fn login_handler(
    State(state): State<ApiState>,
    LoginPayload(request): LoginPayload,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state.login_service.login(&request).await?;
    Ok(Json(LoginResponse { token: issued.access_token }))
}

pub async fn logout_handler(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let TypedHeader(Authorization(bearer)) = bearer.map_err(|_| {
        Error::auth("Bearer token could not be parsed", AuthErrorType::MalformedToken)
    })?;

    state.login_service.logout(&context, bearer.token()).await?;
    Ok((StatusCode::OK, LOGOUT_MESSAGE))
}
