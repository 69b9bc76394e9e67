use axum::http::{Method, StatusCode};

use authgate::auth::TokenCodec;
use authgate::domain::TokenId;
use chrono::{Duration, Utc};

use crate::support::{read_body, read_json, send_request, setup_test_app, test_auth_config};

#[tokio::test]
async fn logout_revokes_the_presented_token() {
    let app = setup_test_app().await;
    let user = app.create_user("a@x.com", "secret").await;
    let token = app.login("a@x.com", "secret").await;

    let response = send_request(&app, Method::GET, "/logout", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_body(response).await, "You have been successfully logged out!");
    assert_eq!(app.token_status(&user.id).await, vec!["revoked"]);
}

#[tokio::test]
async fn revoked_token_is_unusable_afterwards() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;
    let token = app.login("a@x.com", "secret").await;

    let first = send_request(&app, Method::GET, "/logout", Some(&token), None).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send_request(&app, Method::GET, "/logout", Some(&token), None).await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(second).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn logout_only_touches_the_callers_token() {
    let app = setup_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;
    let bob = app.create_user("bob@x.com", "hunter2").await;

    let alice_token = app.login("alice@x.com", "secret").await;
    let alice_other = app.login("alice@x.com", "secret").await;
    let bob_token = app.login("bob@x.com", "hunter2").await;

    let response = send_request(&app, Method::GET, "/logout", Some(&alice_token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.token_status(&alice.id).await, vec!["revoked", "active"]);
    assert_eq!(app.token_status(&bob.id).await, vec!["active"]);

    for token in [&alice_other, &bob_token] {
        let response = send_request(&app, Method::GET, "/logout", Some(token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn foreign_jti_under_own_subject_revokes_nothing() {
    let app = setup_test_app().await;
    let alice = app.create_user("alice@x.com", "secret").await;
    let bob = app.create_user("bob@x.com", "hunter2").await;
    app.login("bob@x.com", "hunter2").await;

    // A correctly signed token naming alice but pointing at a jti she does not own.
    let codec = TokenCodec::from_config(&test_auth_config());
    let now = Utc::now();
    let claims = codec.claims(
        &alice.id,
        &TokenId::new(),
        &test_auth_config().client_name,
        now,
        now + Duration::hours(1),
    );
    let forged = codec.encode(&claims).unwrap();

    let response = send_request(&app, Method::GET, "/logout", Some(&forged), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.token_status(&bob.id).await, vec!["active"]);
}

#[tokio::test]
async fn logout_requires_a_bearer_token() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/logout", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Unauthorized: missing bearer token");

    let response = send_request(&app, Method::GET, "/logout", Some("not-a-jwt"), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_is_get_only() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;
    let token = app.login("a@x.com", "secret").await;

    let response = send_request(&app, Method::POST, "/logout", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
