//! Workflow error types.
//!
//! The `Display` text of each client-facing variant is the exact message the
//! HTTP layer returns; changing one changes the API contract.

use store::StoreError;
use thiserror::Error;

/// Errors that can occur while running a workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Checkout requested without a usable cart.
    #[error("Cart is empty or not found")]
    EmptyCart,

    /// No student record for the customer id.
    #[error("Student not found")]
    StudentNotFound,

    /// Mobile payments must be settled before checkout confirms them.
    #[error("Bkash payment must be completed before confirming order")]
    MobilePaymentIncomplete,

    /// No payment record to derive an order from.
    #[error("Payment not found")]
    PaymentNotFound,

    /// No order with the given id.
    #[error("Order not found")]
    OrderNotFound,

    /// No deliveryman with the given id.
    #[error("Deliveryman not found")]
    DeliverymanNotFound,

    /// Take-away orders are not assignable.
    #[error("This order is not for home delivery")]
    NotHomeDelivery,

    /// The deliveryman has not been approved by an admin.
    #[error("This deliveryman is not approved yet")]
    DeliverymanNotApproved,

    /// The deliveryman is busy or was claimed by a concurrent assignment.
    #[error("This deliveryman is not available")]
    DeliverymanNotAvailable,

    /// Repeated order-id collisions exhausted the retry budget.
    #[error("Could not allocate a unique order id")]
    OrderIdSpaceExhausted,

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
