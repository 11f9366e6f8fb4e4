//! End-to-end registration flow over HTTP.

use std::sync::Arc;

use reqwest::StatusCode;
use turbo_accounts::accounts::SessionToken;
use turbo_accounts::config::{AppConfig, StorageBackend};
use turbo_accounts::store::{MemoryStore, SqliteStore};

mod common;

use common::{location, set_cookie, set_cookie_header, spawn_app, spawn_app_with, PASSWORD};

#[tokio::test]
async fn test_signup_page_has_form() {
    let app = spawn_app().await;
    let res = app.client.get(app.url("/signup")).send().await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.text().await.unwrap();
    assert!(body.contains("<form"));
    assert!(body.contains(r#"name="user[email_address]""#));
    assert!(body.contains(r#"name="user[password_confirmation]""#));
}

#[tokio::test]
async fn test_creates_user_and_session() {
    let app = spawn_app().await;
    let res = app.register("newuser@example.com", PASSWORD, PASSWORD).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert_eq!(set_cookie(&res, "flash").as_deref(), Some("user_created"));

    let token = set_cookie(&res, "session_id").expect("session cookie");
    let header = set_cookie_header(&res, "session_id").unwrap();
    assert!(header.contains("HttpOnly"));
    assert!(header.contains("SameSite=Lax"));

    assert_eq!(app.user_count(), 1);
    let user = app
        .store
        .find_user_by_email("newuser@example.com")
        .unwrap()
        .expect("user persisted");
    assert_eq!(user.email_address, "newuser@example.com");

    let sessions = app.store.sessions_for_user(user.id).unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].token_digest, SessionToken::from_client(&token).digest());
}

#[tokio::test]
async fn test_landing_shows_notice_once_and_current_user() {
    let app = spawn_app().await;
    let res = app.register("newuser@example.com", PASSWORD, PASSWORD).await;
    let token = set_cookie(&res, "session_id").unwrap();

    let landing = app
        .get_with_cookies("/", &[("session_id", &token), ("flash", "user_created")])
        .await;
    assert_eq!(landing.status(), StatusCode::OK);
    assert_eq!(set_cookie(&landing, "flash").as_deref(), Some(""));
    let body = landing.text().await.unwrap();
    assert!(body.contains("User created successfully"));
    assert!(body.contains("Signed in as newuser@example.com"));

    // Flash cookie cleared by the browser; the message is gone.
    let again = app.get_with_cookies("/", &[("session_id", &token)]).await;
    let body = again.text().await.unwrap();
    assert!(!body.contains("User created successfully"));
    assert!(body.contains("Signed in as newuser@example.com"));
}

#[tokio::test]
async fn test_unknown_session_renders_signed_out() {
    let app = spawn_app().await;
    let res = app.get_with_cookies("/", &[("session_id", "forged")]).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!res.text().await.unwrap().contains("Signed in as"));
}

#[tokio::test]
async fn test_normalizes_email() {
    let app = spawn_app().await;
    app.register("  UPPERCASE@EXAMPLE.COM  ", PASSWORD, PASSWORD).await;

    let user = app
        .store
        .find_user_by_email("uppercase@example.com")
        .unwrap()
        .expect("user persisted");
    assert_eq!(user.email_address, "uppercase@example.com");
}

async fn assert_rejected(res: reqwest::Response) {
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signup");
    assert_eq!(set_cookie(&res, "flash").as_deref(), Some("registration_failed"));
    assert!(set_cookie(&res, "session_id").is_none());
}

#[tokio::test]
async fn test_mismatched_confirmation() {
    let app = spawn_app().await;
    let res = app
        .register("test@example.com", PASSWORD, "DifferentPassword123!")
        .await;
    assert_rejected(res).await;
    assert_eq!(app.user_count(), 0);

    let form = app
        .get_with_cookies("/signup", &[("flash", "registration_failed")])
        .await;
    assert!(form.text().await.unwrap().contains("Failed to create user"));
}

#[tokio::test]
async fn test_duplicate_email() {
    let app = spawn_app().await;
    app.register("duplicate@example.com", PASSWORD, PASSWORD).await;
    assert_eq!(app.user_count(), 1);

    let res = app.register("duplicate@example.com", PASSWORD, PASSWORD).await;
    assert_rejected(res).await;
    assert_eq!(app.user_count(), 1);
}

#[tokio::test]
async fn test_duplicate_email_different_case() {
    let app = spawn_app().await;
    app.register("user@example.com", PASSWORD, PASSWORD).await;

    let res = app.register("USER@EXAMPLE.COM", PASSWORD, PASSWORD).await;
    assert_rejected(res).await;
    let res = app.register("  user@example.com\t", PASSWORD, PASSWORD).await;
    assert_rejected(res).await;
    assert_eq!(app.user_count(), 1);
}

#[tokio::test]
async fn test_blank_email() {
    let app = spawn_app().await;
    assert_rejected(app.register("", PASSWORD, PASSWORD).await).await;
    assert_eq!(app.user_count(), 0);
}

#[tokio::test]
async fn test_blank_password() {
    let app = spawn_app().await;
    assert_rejected(app.register("test@example.com", "", "").await).await;
    assert_eq!(app.user_count(), 0);
}

#[tokio::test]
async fn test_short_password() {
    let app = spawn_app().await;
    assert_rejected(app.register("test@example.com", "Short1!", "Short1!").await).await;
    assert_eq!(app.user_count(), 0);
}

#[tokio::test]
async fn test_oversized_form() {
    let app = spawn_app().await;
    let huge = "p".repeat(70 * 1024);
    assert_rejected(app.register("big@example.com", &huge, &huge).await).await;
    assert_eq!(app.user_count(), 0);
}

#[tokio::test]
async fn test_concurrent_same_email_single_winner() {
    let app = Arc::new(spawn_app().await);
    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                let res = app.register("race@example.com", PASSWORD, PASSWORD).await;
                location(&res) == "/"
            })
        })
        .collect();

    let mut winners = 0;
    for attempt in attempts {
        if attempt.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(app.user_count(), 1);
}

#[tokio::test]
async fn test_rate_limit_redirects_without_registering() {
    let mut config = AppConfig::default();
    config.rate_limit.registrations_per_window = 2;
    let app = spawn_app_with(config, Arc::new(MemoryStore::new())).await;

    app.register("one@example.com", PASSWORD, PASSWORD).await;
    app.register("two@example.com", PASSWORD, PASSWORD).await;
    let res = app.register("three@example.com", PASSWORD, PASSWORD).await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/signup");
    assert_eq!(set_cookie(&res, "flash").as_deref(), Some("rate_limited"));
    assert_eq!(app.user_count(), 2);

    let form = app.get_with_cookies("/signup", &[("flash", "rate_limited")]).await;
    assert!(form.text().await.unwrap().contains("Try again later."));
}

#[tokio::test]
async fn test_sqlite_backend() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::default();
    config.storage.backend = StorageBackend::Sqlite;
    config.storage.sqlite_path = dir.path().join("accounts.sqlite3").display().to_string();

    let store = Arc::new(SqliteStore::open(&config.storage.sqlite_path).unwrap());
    let app = spawn_app_with(config, store).await;

    let res = app.register("Sqlite@Example.com", PASSWORD, PASSWORD).await;
    assert_eq!(location(&res), "/");
    let res = app.register("sqlite@example.com", PASSWORD, PASSWORD).await;
    assert_eq!(location(&res), "/signup");

    assert_eq!(app.user_count(), 1);
    let user = app
        .store
        .find_user_by_email("sqlite@example.com")
        .unwrap()
        .unwrap();
    assert_eq!(app.store.sessions_for_user(user.id).unwrap().len(), 1);
}
