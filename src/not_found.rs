//! The fallback response for requests to unknown routes.

use axum::{
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::api_response::ApiResponse;

/// Respond with a 404 envelope naming the unknown path.
pub async fn get_404_not_found(uri: Uri) -> Response {
    ApiResponse::<()>::failure(
        StatusCode::NOT_FOUND,
        "Not found",
        &format!("No route matches {}", uri.path()),
    )
    .into_response()
}
