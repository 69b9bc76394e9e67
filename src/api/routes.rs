use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{health_handler, login_handler, logout_handler};
use crate::auth::{middleware::authenticate, AuthGuard, AuthService, LoginService};
use crate::config::AuthConfig;
use crate::errors::Result;
use crate::storage::DbPool;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub login_service: Arc<LoginService>,
    pub auth_guard: Arc<dyn AuthGuard>,
    pub pool: DbPool,
}

impl ApiState {
    pub fn with_sqlx(pool: DbPool, config: &AuthConfig) -> Result<Self> {
        Ok(Self {
            login_service: Arc::new(LoginService::with_sqlx(pool.clone(), config)?),
            auth_guard: Arc::new(AuthService::with_sqlx(pool.clone(), config)),
            pool,
        })
    }
}

pub fn build_router(state: ApiState) -> Router {
    let guard_layer = middleware::from_fn_with_state(state.auth_guard.clone(), authenticate);

    let private = Router::new().route("/logout", get(logout_handler)).route_layer(guard_layer);

    let public = Router::new()
        .route("/login", post(login_handler))
        .route("/health", get(health_handler));

    public.merge(private).with_state(state).layer(TraceLayer::new_for_http())
}
