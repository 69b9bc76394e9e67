use axum::http::{Method, StatusCode};
use proptest::prelude::*;
use proptest::test_runner::{Config, TestRunner};
use serde_json::json;

use crate::support::{read_body, send_json, setup_test_app};

#[test]
fn any_wrong_password_is_rejected_and_issues_nothing() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let app = rt.block_on(async {
        let app = setup_test_app().await;
        app.create_user("a@x.com", "secret").await;
        app
    });

    let mut runner = TestRunner::new(Config { cases: 32, ..Config::default() });
    let passwords = any::<String>().prop_filter("must differ from the real password", |p| {
        !p.is_empty() && p != "secret"
    });

    runner
        .run(&passwords, |password| {
            let (status, body, tokens) = rt.block_on(async {
                let response = send_json(
                    &app,
                    Method::POST,
                    "/login",
                    None,
                    json!({ "email": "a@x.com", "password": password }),
                )
                .await;
                let status = response.status();
                let body = read_body(response).await;
                (status, body, app.token_count().await)
            });

            prop_assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            prop_assert_eq!(body, "Password mismatch");
            prop_assert_eq!(tokens, 0);
            Ok(())
        })
        .unwrap();
}
