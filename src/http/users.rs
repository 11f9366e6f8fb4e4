//! Signup form and registration.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::accounts::{RegistrationError, RegistrationForm, SessionContext, SessionToken};
use crate::config::SessionConfig;
use crate::http::flash::{self, Flash};
use crate::http::request::{ClientIp, RequestId};
use crate::http::server::AppState;
use crate::http::views;
use crate::native::NativeClient;
use crate::observability::metrics;

pub const SIGNUP_PATH: &str = "/signup";
pub const AFTER_AUTHENTICATION_PATH: &str = "/";

/// `GET /signup`
pub async fn new_user(
    State(state): State<AppState>,
    client: NativeClient,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, flash) = flash::take(jar);
    (jar, views::signup(client, flash, state.registrar.min_password_length()))
}

/// `POST /register`
///
/// Every failure, whatever its cause, ends in the same redirect back to the
/// form with the same generic alert.
pub async fn create_user(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    ClientIp(ip): ClientIp,
    client: NativeClient,
    headers: HeaderMap,
    jar: CookieJar,
    form: Result<Form<RegistrationForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!(request_id = %request_id, error = %rejection, "Unreadable registration form");
            metrics::record_registration("invalid");
            return registration_failed(jar);
        }
    };

    let context = SessionContext {
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ip_address: ip.map(|ip| ip.to_string()),
    };

    let registrar = state.registrar.clone();
    let outcome = tokio::task::spawn_blocking(move || registrar.register(&form, context))
        .await
        .unwrap_or_else(|e| Err(RegistrationError::Unexpected(format!("registration task: {e}"))));

    match outcome {
        Ok(registration) => {
            tracing::info!(
                request_id = %request_id,
                user_id = %registration.user.id,
                session_id = %registration.session.id,
                client = client.as_str(),
                "User registered"
            );
            metrics::record_registration("created");

            let jar = jar.add(session_cookie(&state.session, &registration.token));
            let jar = flash::set(jar, Flash::UserCreated);
            (jar, Redirect::to(AFTER_AUTHENTICATION_PATH)).into_response()
        }
        Err(err) => {
            match &err {
                RegistrationError::Unexpected(_) => {
                    tracing::error!(request_id = %request_id, error = %err, "Registration failed")
                }
                _ => tracing::warn!(
                    request_id = %request_id,
                    reason = err.kind(),
                    error = %err,
                    "Registration rejected"
                ),
            }
            metrics::record_registration(err.kind());
            registration_failed(jar)
        }
    }
}

fn registration_failed(jar: CookieJar) -> Response {
    let jar = flash::set(jar, Flash::RegistrationFailed);
    (jar, Redirect::to(SIGNUP_PATH)).into_response()
}

/// The cookie carrying a session identifier to the client.
pub fn session_cookie(config: &SessionConfig, token: &SessionToken) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(SameSite::Lax)
        .permanent()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let config = SessionConfig {
            cookie_name: "session_id".into(),
            secure_cookie: true,
        };
        let token = SessionToken::generate();
        let cookie = session_cookie(&config, &token);
        assert_eq!(cookie.name(), "session_id");
        assert_eq!(cookie.value(), token.as_str());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
