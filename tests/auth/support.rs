use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request},
    response::Response,
    Router,
};
use authgate::{
    api::{build_router, ApiState},
    auth::{hashing, user::NewUser, User},
    config::{AuthConfig, DatabaseConfig},
    domain::UserId,
    storage::{create_pool, DbPool, SqlxUserRepository, UserRepository},
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    state: ApiState,
    pub pool: DbPool,
}

impl TestApp {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Insert a user directly; the API has no registration endpoint.
    pub async fn create_user(&self, email: &str, password: &str) -> User {
        let hasher = hashing::password_hasher(64, 1).expect("argon2 params");
        SqlxUserRepository::new(self.pool.clone())
            .create_user(NewUser {
                id: UserId::new(),
                email: email.to_string(),
                name: email.split('@').next().unwrap_or(email).to_string(),
                password_hash: hashing::hash_password(&hasher, password).expect("hash password"),
            })
            .await
            .expect("create user")
    }

    pub async fn token_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM access_tokens")
            .fetch_one(&self.pool)
            .await
            .expect("count tokens")
    }

    pub async fn token_status(&self, user_id: &UserId) -> Vec<String> {
        sqlx::query_scalar("SELECT status FROM access_tokens WHERE user_id = $1 ORDER BY created_at")
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .expect("token statuses")
    }

    /// Log in through the API and return the bearer token.
    pub async fn login(&self, email: &str, password: &str) -> String {
        let response = send_json(
            self,
            Method::POST,
            "/login",
            None,
            serde_json::json!({ "email": email, "password": password }),
        )
        .await;
        assert_eq!(response.status(), 200, "login should succeed");
        let body: Value = serde_json::from_str(&read_body(response).await).expect("json body");
        body["token"].as_str().expect("token field").to_string()
    }
}

pub fn test_auth_config() -> AuthConfig {
    AuthConfig { argon2_memory_kib: 64, argon2_iterations: 1, ..AuthConfig::default() }
}

pub async fn setup_test_app() -> TestApp {
    let pool = create_pool(&DatabaseConfig::in_memory()).await.expect("create sqlite pool");
    let state = ApiState::with_sqlx(pool.clone(), &test_auth_config()).expect("api state");
    TestApp { state, pool }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<(&str, String)>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some((content_type, body)) => builder
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    app.router().oneshot(request).await.expect("request")
}

pub async fn send_json(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Value,
) -> Response {
    let body = serde_json::to_string(&body).expect("serialize body");
    send_request(app, method, path, token, Some(("application/json", body))).await
}

pub async fn read_body(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn read_json(response: Response) -> Value {
    serde_json::from_str(&read_body(response).await).expect("parse json")
}
