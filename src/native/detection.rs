//! Native shell detection from the `User-Agent` header.
//!
//! Turbo Native apps append a marker to the web view's user agent. The
//! markers are matched as case-sensitive substrings; anything else, including
//! a missing or non-UTF-8 header, is a plain browser.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;

pub const IOS_MARKER: &str = "Turbo Native iOS";
pub const ANDROID_MARKER: &str = "Turbo Native Android";

/// Which Turbo Native markers a request's user agent carries.
///
/// The markers are checked independently: a user agent carrying both is
/// both an iOS and an Android shell. For rendering, iOS takes precedence
/// (see [`NativeClient::as_str`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeClient {
    ios: bool,
    android: bool,
}

impl NativeClient {
    pub const BROWSER: Self = Self { ios: false, android: false };
    pub const IOS: Self = Self { ios: true, android: false };
    pub const ANDROID: Self = Self { ios: false, android: true };

    /// Classify a raw user-agent string. Never fails.
    pub fn detect(user_agent: Option<&str>) -> Self {
        let ua = user_agent.unwrap_or("");
        Self {
            ios: ua.contains(IOS_MARKER),
            android: ua.contains(ANDROID_MARKER),
        }
    }

    pub fn is_native(self) -> bool {
        self.ios || self.android
    }

    pub fn is_ios(self) -> bool {
        self.ios
    }

    pub fn is_android(self) -> bool {
        self.android
    }

    /// Label used for the `client-*` body class and logs.
    pub fn as_str(self) -> &'static str {
        if self.ios {
            "ios"
        } else if self.android {
            "android"
        } else {
            "browser"
        }
    }
}

impl<S> FromRequestParts<S> for NativeClient
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok());
        Ok(NativeClient::detect(user_agent))
    }
}
