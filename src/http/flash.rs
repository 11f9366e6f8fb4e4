//! Flash messages.
//!
//! A flash survives exactly one redirect: it is written as a cookie holding a
//! message code and cleared by the page that renders it. Only codes travel
//! through the client, so the rendered text is always one of the fixed
//! messages below.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

pub const FLASH_COOKIE: &str = "flash";

/// Whether a flash reports success or a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Notice,
    Alert,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Notice => "notice",
            FlashLevel::Alert => "alert",
        }
    }
}

/// Every one-shot message the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    UserCreated,
    RegistrationFailed,
    RateLimited,
}

impl Flash {
    pub fn code(self) -> &'static str {
        match self {
            Flash::UserCreated => "user_created",
            Flash::RegistrationFailed => "registration_failed",
            Flash::RateLimited => "rate_limited",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "user_created" => Some(Flash::UserCreated),
            "registration_failed" => Some(Flash::RegistrationFailed),
            "rate_limited" => Some(Flash::RateLimited),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::UserCreated => "User created successfully",
            Flash::RegistrationFailed => "Failed to create user",
            Flash::RateLimited => "Try again later.",
        }
    }

    pub fn level(self) -> FlashLevel {
        match self {
            Flash::UserCreated => FlashLevel::Notice,
            Flash::RegistrationFailed | Flash::RateLimited => FlashLevel::Alert,
        }
    }
}

fn flash_cookie(value: &'static str) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Attach `flash` to the next rendered page.
pub fn set(jar: CookieJar, flash: Flash) -> CookieJar {
    jar.add(flash_cookie(flash.code()))
}

/// Read the pending flash, if any, and clear it.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
    let Some(code) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, None);
    };
    let jar = jar.remove(flash_cookie(""));
    (jar, Flash::from_code(&code))
}
