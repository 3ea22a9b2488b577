//! Business workflows spanning the cafeteria stores.
//!
//! Each workflow is a thin struct over an injected store set; nothing here
//! holds state across requests. The janitor is the one background
//! component, running on its own timer with its own failure path.

pub mod assign;
pub mod cancel;
pub mod checkout;
pub mod error;
pub mod janitor;
pub mod orders;

pub use assign::AssignmentWorkflow;
pub use cancel::{CancellationOutcome, CancellationWorkflow, RefundDetails};
pub use checkout::{CheckoutOutcome, CheckoutRequest, CheckoutWorkflow};
pub use error::{Result, WorkflowError};
pub use janitor::StatusJanitor;
pub use orders::{CreateOrderRequest, OrderWorkflow};
