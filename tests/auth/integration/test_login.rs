use axum::http::{header::CONTENT_TYPE, Method, StatusCode};
use serde_json::json;

use crate::support::{read_body, read_json, send_json, send_request, setup_test_app};

#[tokio::test]
async fn correct_credentials_return_a_token() {
    let app = setup_test_app().await;
    let user = app.create_user("a@x.com", "secret").await;

    let response = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": "a@x.com", "password": "secret" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(app.token_status(&user.id).await, vec!["active"]);
}

#[tokio::test]
async fn each_login_issues_exactly_one_token() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let first = app.login("a@x.com", "secret").await;
    assert_eq!(app.token_count().await, 1);
    let second = app.login("a@x.com", "secret").await;
    assert_eq!(app.token_count().await, 2);
    assert_ne!(first, second);
}

#[tokio::test]
async fn wrong_password_is_a_mismatch() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let response = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": "a@x.com", "password": "wrong" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_body(response).await, "Password mismatch");
    assert_eq!(app.token_count().await, 0);
}

#[tokio::test]
async fn unknown_email_does_not_exist() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let response = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": "missing@x.com", "password": "secret" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert_eq!(read_body(response).await, "User doesn't exist");
    assert_eq!(app.token_count().await, 0);
}

#[tokio::test]
async fn email_match_is_exact() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let response = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": "A@X.com", "password": "secret" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_body(response).await, "User doesn't exist");
}

#[tokio::test]
async fn form_encoded_credentials_are_accepted() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let response = send_request(
        &app,
        Method::POST,
        "/login",
        None,
        Some(("application/x-www-form-urlencoded", "email=a%40x.com&password=secret".into())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_json(response).await["token"].is_string());
}

#[tokio::test]
async fn missing_fields_are_rejected_without_issuing() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let response =
        send_json(&app, Method::POST, "/login", None, json!({ "email": "a@x.com" })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_body(response).await, "The password field is required.");

    let response = send_request(&app, Method::POST, "/login", None, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        read_body(response).await,
        "The email field is required. The password field is required."
    );

    assert_eq!(app.token_count().await, 0);
}

#[tokio::test]
async fn null_credentials_are_validation_failures() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let response = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": null, "password": "x" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));
    assert_eq!(read_body(response).await, "The email field is required.");
    assert_eq!(app.token_count().await, 0);
}

#[tokio::test]
async fn empty_body_is_a_validation_failure_for_any_content_type() {
    let app = setup_test_app().await;

    for content_type in ["application/json", "application/x-www-form-urlencoded"] {
        let response =
            send_request(&app, Method::POST, "/login", None, Some((content_type, "  ".into())))
                .await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{content_type}");
        assert_eq!(
            read_body(response).await,
            "The email field is required. The password field is required."
        );
    }
}

#[tokio::test]
async fn unparseable_json_is_a_bad_request() {
    let app = setup_test_app().await;

    let response = send_request(
        &app,
        Method::POST,
        "/login",
        None,
        Some(("application/json", "{not json".into())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn documented_scenario() {
    let app = setup_test_app().await;
    app.create_user("a@x.com", "secret").await;

    let ok = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": "a@x.com", "password": "secret" }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let mismatch = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": "a@x.com", "password": "nope" }),
    )
    .await;
    assert_eq!(mismatch.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_body(mismatch).await, "Password mismatch");

    let missing = send_json(
        &app,
        Method::POST,
        "/login",
        None,
        json!({ "email": "missing@x.com", "password": "secret" }),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(read_body(missing).await, "User doesn't exist");

    assert_eq!(app.token_count().await, 1);
}
