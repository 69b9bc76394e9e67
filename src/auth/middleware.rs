//! Axum middleware that admits requests carrying a live bearer token.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info_span, warn, Instrument};

use crate::api::error::ApiError;
use crate::auth::auth_service::AuthGuard;

pub type AuthGuardState = Arc<dyn AuthGuard>;

/// Resolve the `Authorization` header and attach the resulting
/// [`AuthContext`](crate::auth::models::AuthContext) to the request extensions.
pub async fn authenticate(
    State(guard): State<AuthGuardState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %request.method(),
        http.path = %request.uri().path(),
        correlation_id = %correlation_id
    );

    async move {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();

        match guard.authenticate(&header).await {
            Ok(context) => {
                request.extensions_mut().insert(context);
                Ok(next.run(request).await)
            }
            Err(err) => {
                warn!(%correlation_id, error = %err, "authentication failed");
                Err(ApiError::from(err))
            }
        }
    }
    .instrument(span)
    .await
}
