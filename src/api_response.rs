//! The uniform JSON envelope that every API response is wrapped in.

use axum::{
    Json,
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The body of every API response.
///
/// Successful responses set `data` and leave `error` empty, failed responses
/// do the opposite. `status` mirrors the HTTP status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// The HTTP status code of the response.
    pub status: u16,
    /// The payload of a successful response.
    pub data: Option<T>,
    /// A short summary of what went wrong.
    pub error: Option<String>,
    /// A human readable note about the outcome.
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` in a successful response.
    pub fn success(status: StatusCode, data: T, message: &str) -> Self {
        Self {
            status: status.as_u16(),
            data: Some(data),
            error: None,
            message: Some(message.to_owned()),
        }
    }

    /// Create a failed response without a payload.
    pub fn failure(status: StatusCode, error: &str, message: &str) -> Self {
        Self {
            status: status.as_u16(),
            data: None,
            error: Some(error.to_owned()),
            message: Some(message.to_owned()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self)).into_response()
    }
}

/// A JSON body extractor that reports parse failures with the [ApiResponse]
/// envelope and a 400 status instead of axum's plain text rejection.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);
