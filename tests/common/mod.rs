//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{COOKIE, SET_COOKIE};
use tokio::net::TcpListener;
use turbo_accounts::config::AppConfig;
use turbo_accounts::http::AppServer;
use turbo_accounts::lifecycle::Shutdown;
use turbo_accounts::store::{AccountStore, MemoryStore};

pub const PASSWORD: &str = "SecurePassword123!";

/// A running server bound to an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<dyn AccountStore>,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit the signup form.
    pub async fn register(&self, email: &str, password: &str, confirmation: &str) -> reqwest::Response {
        self.client
            .post(self.url("/register"))
            .form(&[
                ("user[email_address]", email),
                ("user[password]", password),
                ("user[password_confirmation]", confirmation),
            ])
            .send()
            .await
            .expect("server unreachable")
    }

    /// GET `path` sending the given cookies.
    pub async fn get_with_cookies(&self, path: &str, cookies: &[(&str, &str)]) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if !cookies.is_empty() {
            let header = cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            request = request.header(COOKIE, header);
        }
        request.send().await.expect("server unreachable")
    }

    pub fn user_count(&self) -> usize {
        self.store.user_count().unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with default config and an in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(AppConfig::default(), Arc::new(MemoryStore::new())).await
}

/// Start a server with the given config and store.
pub async fn spawn_app_with(config: AppConfig, store: Arc<dyn AccountStore>) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = AppServer::new(config, store.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap();

    TestApp {
        addr,
        store,
        client,
        shutdown,
    }
}

/// Value of cookie `name` as set by `response`, if any.
///
/// An empty value means the server asked for the cookie to be removed.
pub fn set_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| k.trim() == name)
        .map(|(_, v)| v.trim().to_string())
}

/// Full `Set-Cookie` header for cookie `name`.
pub fn set_cookie_header(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .map(str::to_string)
}

pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}
