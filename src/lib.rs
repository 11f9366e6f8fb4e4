//! Account and native-shell support server for Turbo Native apps.

pub mod accounts;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod native;
pub mod observability;
pub mod security;
pub mod store;

pub use config::AppConfig;
pub use http::AppServer;
pub use lifecycle::Shutdown;
