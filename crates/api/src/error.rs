//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use workflow::WorkflowError;

/// API-level error type that maps to HTTP responses.
///
/// Client errors carry only their contract message; internal errors carry an
/// endpoint-specific message plus the raw error text (diagnostic, not
/// sanitized).
#[derive(Debug)]
pub enum ApiError {
    /// Failed precondition or validation (400).
    BadRequest(String),
    /// Resource not found (404).
    NotFound(String),
    /// Store or other internal failure (500).
    Internal { message: String, error: String },
}

impl ApiError {
    /// Maps a workflow failure onto the HTTP contract. `context` becomes
    /// the `message` of internal errors (each endpoint reports its own).
    pub fn wrap(err: WorkflowError, context: &str) -> Self {
        match err {
            WorkflowError::EmptyCart
            | WorkflowError::MobilePaymentIncomplete
            | WorkflowError::NotHomeDelivery
            | WorkflowError::DeliverymanNotApproved
            | WorkflowError::DeliverymanNotAvailable => ApiError::BadRequest(err.to_string()),

            WorkflowError::StudentNotFound
            | WorkflowError::PaymentNotFound
            | WorkflowError::OrderNotFound
            | WorkflowError::DeliverymanNotFound => ApiError::NotFound(err.to_string()),

            WorkflowError::OrderIdSpaceExhausted | WorkflowError::Store(_) => {
                ApiError::Internal {
                    message: context.to_string(),
                    error: err.to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                axum::Json(serde_json::json!({ "message": message })),
            )
                .into_response(),
            ApiError::Internal { message, error } => {
                tracing::error!(%error, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(serde_json::json!({ "message": message, "error": error })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failures_map_to_bad_request() {
        let err = ApiError::wrap(WorkflowError::EmptyCart, "Payment failed");
        assert!(matches!(
            err,
            ApiError::BadRequest(ref msg) if msg == "Cart is empty or not found"
        ));
    }

    #[test]
    fn lookup_failures_map_to_not_found() {
        let err = ApiError::wrap(WorkflowError::OrderNotFound, "Cancellation failed");
        assert!(matches!(
            err,
            ApiError::NotFound(ref msg) if msg == "Order not found"
        ));
    }

    #[test]
    fn store_failures_keep_the_endpoint_context() {
        let err = ApiError::wrap(
            WorkflowError::OrderIdSpaceExhausted,
            "Failed to create order",
        );
        match err {
            ApiError::Internal { message, error } => {
                assert_eq!(message, "Failed to create order");
                assert!(!error.is_empty());
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }
}
