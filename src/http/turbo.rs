//! Endpoints consumed by Turbo Native shells.

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::Json;

use crate::native::PathConfiguration;

pub const IOS_PATH_CONFIGURATION_PATH: &str = "/turbo/ios/path_configuration.json";

/// `GET /turbo/ios/path_configuration.json`
///
/// Unauthenticated and always succeeds.
pub async fn ios_path_configuration() -> impl IntoResponse {
    (
        [(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        )],
        Json(PathConfiguration::get()),
    )
}
