mod common;

use axum::http::StatusCode;
use common::{
    body_json, location, session_cookie, MemoryUserStore, TestApp, TEST_EMAIL, TEST_PASSWORD,
};
use serde_json::json;

fn login_body(email: &str, password: &str) -> String {
    format!("email={}&password={}", email, password)
}

#[tokio::test]
async fn valid_login_redirects_to_dashboard_and_opens_a_session() {
    let app = TestApp::spawn();

    let response = app
        .post_form("/login", &login_body(TEST_EMAIL, TEST_PASSWORD), None)
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
    let cookie = session_cookie(&response).expect("session cookie");

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], TEST_EMAIL);
    assert_eq!(body["user"]["name"], "User");
}

#[tokio::test]
async fn login_honors_local_redirect_target() {
    let app = TestApp::spawn();

    let response = app
        .post_form(
            "/login",
            &format!(
                "{}&redirectTo=%2Fdashboard%2Finvoices",
                login_body(TEST_EMAIL, TEST_PASSWORD)
            ),
            None,
        )
        .await;

    assert_eq!(location(&response), Some("/dashboard/invoices"));
}

#[tokio::test]
async fn login_ignores_external_redirect_target() {
    let app = TestApp::spawn();

    let response = app
        .post_form(
            "/login",
            &format!(
                "{}&redirectTo=https%3A%2F%2Fevil.example",
                login_body(TEST_EMAIL, TEST_PASSWORD)
            ),
            None,
        )
        .await;

    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn htmx_login_uses_hx_redirect() {
    let app = TestApp::spawn();

    let response = app
        .post_htmx("/login", &login_body(TEST_EMAIL, TEST_PASSWORD), None)
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("hx-redirect").unwrap(), "/dashboard");
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let app = TestApp::spawn();

    let response = app
        .post_form("/login", &login_body(TEST_EMAIL, "wrong-password"), None)
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(session_cookie(&response).is_none());
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Invalid credentials." })
    );
}

#[tokio::test]
async fn unknown_user_and_malformed_input_are_invalid_credentials() {
    let app = TestApp::spawn();

    for body in [
        login_body("nobody@nextmail.com", TEST_PASSWORD),
        login_body("not-an-email", TEST_PASSWORD),
        login_body(TEST_EMAIL, "123"),
        String::new(),
    ] {
        let response = app.post_form("/login", &body, None).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["message"], "Invalid credentials.");
    }
}

#[tokio::test]
async fn corrupt_stored_hash_is_something_went_wrong() {
    let app = TestApp::with_users(MemoryUserStore::with_raw_hash(TEST_EMAIL, "plaintext"));

    let response = app
        .post_form("/login", &login_body(TEST_EMAIL, TEST_PASSWORD), None)
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Something went wrong." })
    );
}

#[tokio::test]
async fn user_store_outage_is_a_server_error() {
    let app = TestApp::spawn();
    app.users.set_down(true);

    let response = app
        .post_form("/login", &login_body(TEST_EMAIL, TEST_PASSWORD), None)
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Internal server error");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let app = TestApp::spawn();
    let cookie = app.login().await;

    let response = app.post_form("/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = app.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}
