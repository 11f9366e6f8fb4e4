//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, client IP)
//!     → handlers:
//!         pages.rs  (GET /, GET /up)
//!         users.rs  (GET /signup, POST /register)
//!         turbo.rs  (GET /turbo/ios/path_configuration.json)
//!     → views.rs + flash.rs (HTML, one-shot messages)
//!     → Send to client
//! ```

pub mod flash;
pub mod pages;
pub mod request;
pub mod server;
pub mod turbo;
pub mod users;
pub mod views;

pub use request::{ClientIp, RequestId, X_REQUEST_ID};
pub use server::{AppServer, AppState};
