use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::protocol::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad JSON: {0}")]
    BadJson(String),
}

impl ApiError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadJson(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message shown to clients; details stay in the server log
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::BadJson(_) => "Bad JSON",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!("Request rejected: {}", self);
        let body = ErrorResponse::new(self.public_message());
        (self.status(), Json(body)).into_response()
    }
}
