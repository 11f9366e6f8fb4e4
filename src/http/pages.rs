//! Landing page and liveness check.

use axum::extract::State;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;

use crate::accounts::{SessionToken, User};
use crate::http::flash;
use crate::http::request::RequestId;
use crate::http::server::AppState;
use crate::http::views;
use crate::native::NativeClient;
use crate::store::StoreError;

/// `GET /`
pub async fn landing(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    client: NativeClient,
    jar: CookieJar,
) -> impl IntoResponse {
    let current_user = match jar.get(&state.session.cookie_name) {
        Some(cookie) => resume_session(&state, SessionToken::from_client(cookie.value()), &request_id).await,
        None => None,
    };

    let (jar, flash) = flash::take(jar);
    let email = current_user.as_ref().map(|u| u.email_address.as_str());
    (jar, views::landing(client, flash, email))
}

/// Resolve the user owning the session behind `token`.
///
/// Unknown tokens and store failures both yield `None`; the page then renders
/// as signed out.
async fn resume_session(state: &AppState, token: SessionToken, request_id: &str) -> Option<User> {
    let store = state.registrar.store().clone();
    let lookup = tokio::task::spawn_blocking(move || -> Result<Option<User>, StoreError> {
        match store.find_session_by_token_digest(&token.digest())? {
            Some(session) => store.find_user(session.user_id),
            None => Ok(None),
        }
    })
    .await;

    match lookup {
        Ok(Ok(user)) => user,
        Ok(Err(e)) => {
            tracing::error!(request_id = %request_id, error = %e, "Session lookup failed");
            None
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Session lookup task failed");
            None
        }
    }
}

/// `GET /up`
pub async fn up() -> &'static str {
    "OK"
}
