//! Route handlers grouped by resource.

pub mod deliverymen;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;

use store::Stores;
use workflow::{AssignmentWorkflow, CancellationWorkflow, CheckoutWorkflow, OrderWorkflow};

/// Shared application state accessible from all handlers.
pub struct AppState<S: Stores> {
    pub checkout: CheckoutWorkflow<S>,
    pub orders: OrderWorkflow<S>,
    pub cancellation: CancellationWorkflow<S>,
    pub assignment: AssignmentWorkflow<S>,
}
