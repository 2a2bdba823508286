//! Writes committed by another request between our read and our write

use axum::http::StatusCode;
use serde_json::json;

use super::support::{PASSWORD, TestApp, eventually};
use crate::domain::value_object::user_password::{RawPassword, UserPassword};

const NEW_PASSWORD: &str = "Serengeti#2027";

fn hash(password: &str) -> UserPassword {
    UserPassword::from_raw(&RawPassword::candidate(password.to_string()), None).unwrap()
}

#[tokio::test]
async fn test_login_keeps_password_reset_in_flight() {
    let app = TestApp::new();
    app.register("amina", "amina@example.com").await;

    let new_hash = hash(NEW_PASSWORD);
    app.store
        .write_after_next_read(move |user| user.password = new_hash);

    app.login("amina", PASSWORD).await;

    let stored = app.store.user_named("amina").unwrap();
    assert!(stored.last_login_at.is_some());
    app.login("amina", NEW_PASSWORD).await;
    let (status, _) = app
        .post("/token", json!({ "identifier": "amina", "password": PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_keeps_confirmation_in_flight() {
    let app = TestApp::new();
    app.register("amina", "amina@example.com").await;

    app.store
        .write_after_next_read(|user| user.is_confirmed = true);
    app.login("amina@example.com", PASSWORD).await;

    let stored = app.store.user_named("amina").unwrap();
    assert!(stored.is_confirmed);
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn test_reset_confirm_loses_to_earlier_password_change() {
    let app = TestApp::new();
    app.register("amina", "amina@example.com").await;
    app.post("/password/reset", json!({ "email": "amina@example.com" }))
        .await;
    eventually(|| app.mailer.sent().len() == 2).await;

    let reset_mail = app
        .mailer
        .sent()
        .into_iter()
        .rfind(|m| m.subject == "Reset Your Password")
        .unwrap();
    let link = reset_mail
        .body
        .split_whitespace()
        .find(|w| w.starts_with(&app.config.front_end_url))
        .unwrap()
        .to_string();
    let (uid, token) = link[app.config.front_end_url.len()..]
        .split_once('/')
        .unwrap();

    // The same link redeemed twice at once: the other redemption commits first
    let other_hash = hash("Ngorongoro#2028");
    app.store
        .write_after_next_read(move |user| user.password = other_hash);

    let (status, body) = app
        .post(
            "/password/reset/confirm",
            json!({ "uid": uid, "token": token, "new_password": NEW_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["token"].is_array());

    app.login("amina", "Ngorongoro#2028").await;
}

#[tokio::test]
async fn test_change_password_loses_to_concurrent_change() {
    let app = TestApp::new();
    app.confirmed_user("amina", "amina@example.com").await;
    let (access, _) = app.login("amina", PASSWORD).await;

    let other_hash = hash("Ngorongoro#2028");
    app.store
        .write_after_next_read(move |user| user.password = other_hash);

    let (status, body) = app
        .post_auth(
            "/password/change",
            &access,
            json!({ "old_password": PASSWORD, "new_password": NEW_PASSWORD }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["old_password"].is_array());

    let (status, _) = app
        .post("/token", json!({ "identifier": "amina", "password": NEW_PASSWORD }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_email_is_single_use() {
    let app = TestApp::new();
    let user = app.register("amina", "amina@example.com").await;
    let payload = json!({
        "email": "amina@example.com",
        "confirm_number": user.confirm_number.as_str(),
    });

    let (first, second) = tokio::join!(
        app.post("/verify-email", payload.clone()),
        app.post("/verify-email", payload),
    );

    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::NOT_FOUND]);
    assert!(app.store.user_named("amina").unwrap().is_confirmed);
}
