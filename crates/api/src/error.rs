//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fulfillment::FulfillmentError;
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
///
/// Business rejections are not errors here; they are answered with `200`
/// and a `{"status": "error"}` body by the route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Engine fault or precondition violation.
    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Fulfillment(FulfillmentError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::Fulfillment(FulfillmentError::Collaborator { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Fulfillment(FulfillmentError::Configuration(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Fulfillment(FulfillmentError::Collaborator { step, .. }) => {
                tracing::error!(step = *step, error = %self, "collaborator fault");
            }
            ApiError::Fulfillment(FulfillmentError::Configuration(_)) => {
                tracing::error!(error = %self, "engine misconfigured");
            }
            _ => {}
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
