//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, body limit, headers)
//!
//! The body limit is enforced by extractors (`DefaultBodyLimit`), so an
//! oversized form is a rejection the handler turns into its usual failure
//! redirect rather than a bare 413.
//! - Bind server to listener with connect info (client IPs)
//! - Graceful shutdown on the lifecycle signal

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::accounts::Registrar;
use crate::config::{AppConfig, SessionConfig};
use crate::http::request::{request_id_of, X_REQUEST_ID};
use crate::http::{pages, turbo, users};
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::security::{rate_limit_middleware, with_security_headers, RateLimiter};
use crate::store::AccountStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registrar: Registrar,
    pub session: SessionConfig,
}

/// HTTP server for the account service.
pub struct AppServer {
    router: Router,
    config: AppConfig,
}

impl AppServer {
    /// Create a new HTTP server with the given configuration and store.
    pub fn new(config: AppConfig, store: Arc<dyn AccountStore>) -> Self {
        let state = AppState {
            registrar: Registrar::new(store, config.accounts.min_password_length),
            session: config.session.clone(),
        };
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        let router = Self::build_router(&config, state, limiter);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
        let routes = Router::new()
            .route("/", get(pages::landing))
            .route("/up", get(pages::up))
            .route(users::SIGNUP_PATH, get(users::new_user))
            .route(
                "/register",
                post(users::create_user)
                    .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware)),
            )
            .route(turbo::IOS_PATH_CONFIGURATION_PATH, get(turbo::ios_path_configuration))
            // Route layer so MatchedPath is available for labels.
            .route_layer(middleware::from_fn(metrics::track_metrics))
            .with_state(state);

        let routes = if config.security.enable_headers {
            with_security_headers(routes)
        } else {
            routes
        };

        routes.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id_of(request.headers()),
                    )
                }))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(DefaultBodyLimit::max(config.security.max_body_size)),
        )
    }

    /// The configured router, without a listener. Used by tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            storage = ?self.config.storage.backend,
            rate_limit = self.config.rate_limit.enabled,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
