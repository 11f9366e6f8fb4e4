//! Support for Turbo Native shells.
//!
//! # Data Flow
//! ```text
//! User-Agent header
//!     → detection.rs (NativeClient extractor)
//!     → views branch on is_native()
//!
//! GET /turbo/ios/path_configuration.json
//!     → path_configuration.rs (static document)
//! ```

pub mod detection;
pub mod path_configuration;

pub use detection::NativeClient;
pub use path_configuration::{PathConfiguration, PathConfigurationRule};
