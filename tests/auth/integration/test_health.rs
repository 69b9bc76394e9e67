use axum::http::{Method, StatusCode};

use crate::support::{read_json, send_request, setup_test_app};

#[tokio::test]
async fn health_reports_ok_with_version() {
    let app = setup_test_app().await;

    let response = send_request(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], authgate::VERSION);
}

#[tokio::test]
async fn health_is_unavailable_when_the_store_is_closed() {
    let app = setup_test_app().await;
    app.pool.close().await;

    let response = send_request(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
