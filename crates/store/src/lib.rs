//! Data-access layer for the cafeteria backend.
//!
//! Each collection (students, carts, payments, orders, deliverymen) is
//! exposed behind an async trait so workflows receive their stores by
//! dependency injection and tests can substitute the in-memory
//! implementation. Every cross-request hazard (wallet balance, deliveryman
//! availability, stale-order sweep, order-id uniqueness) is resolved by a
//! single conditional statement in the store, never by read-modify-write in
//! a workflow.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::InMemoryStores;
pub use postgres::PostgresStores;
pub use traits::{
    CartStore, DeliverymanStore, OrderStore, PaymentStore, Stores, StudentStore,
};
