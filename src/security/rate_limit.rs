//! Per-client rate limiting for registration attempts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::config::RateLimitConfig;
use crate::http::flash::{self, Flash};
use crate::http::request::ClientIp;
use crate::http::users::SIGNUP_PATH;
use crate::observability::metrics;

/// A simple token bucket rate limiter.
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Whether the bucket would be back at capacity by `now`.
    fn is_full(&self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        self.tokens + elapsed * refill_rate >= capacity
    }
}

/// Checks between sweeps of idle buckets.
const SWEEP_EVERY: u64 = 1024;

#[derive(Default)]
struct Buckets {
    by_client: HashMap<String, TokenBucket>,
    checks: u64,
}

/// Registration limiter keyed by client IP.
///
/// Allows `registrations_per_window` attempts in a burst, refilled evenly over
/// `window_secs`. A client whose bucket has refilled completely is
/// indistinguishable from a new one, so such buckets are dropped on a
/// periodic sweep.
pub struct RateLimiter {
    buckets: Mutex<Buckets>,
    enabled: bool,
    capacity: f64,
    refill_rate: f64,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let capacity = config.registrations_per_window as f64;
        Self {
            buckets: Mutex::new(Buckets::default()),
            enabled: config.enabled,
            capacity,
            refill_rate: capacity / config.window_secs.max(1) as f64,
        }
    }

    /// Take one attempt from `key`'s budget. Returns false when exhausted.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }
        let mut buckets = self.buckets.lock().expect("rate limiter mutex poisoned");
        let allowed = buckets
            .by_client
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity, now))
            .try_acquire(self.capacity, self.refill_rate, now);

        buckets.checks += 1;
        if buckets.checks % SWEEP_EVERY == 0 {
            self.sweep(&mut buckets.by_client, now);
        }
        allowed
    }

    fn sweep(&self, by_client: &mut HashMap<String, TokenBucket>, now: Instant) {
        let before = by_client.len();
        by_client.retain(|_, bucket| !bucket.is_full(self.capacity, self.refill_rate, now));
        tracing::debug!(
            removed = before - by_client.len(),
            remaining = by_client.len(),
            "Swept idle rate limit buckets"
        );
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.buckets.lock().unwrap().by_client.len()
    }
}

/// Middleware guarding `POST /register`.
///
/// Over-limit clients are sent back to the signup form without the request
/// reaching the registrar.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = match ClientIp::from_extensions(request.extensions()).0 {
        Some(ip) => ip.to_string(),
        None => "unknown".to_string(),
    };

    if limiter.check(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, "Registration rate limit exceeded");
        metrics::record_rate_limited();
        let jar = flash::set(CookieJar::new(), Flash::RateLimited);
        (jar, Redirect::to(SIGNUP_PATH)).into_response()
    }
}
