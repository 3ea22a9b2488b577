//! Store traits, one per collection.
//!
//! All implementations must be thread-safe (Send + Sync). List results are
//! returned newest first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, DeliverymanId, Money, OrderId};
use domain::{
    AssignedDeliveryman, Cart, Deliveryman, DeliverymanStatus, Order, OrderStatus, Payment,
    PaymentStatus, Student,
};

use crate::Result;

/// Access to student records and their wallet balance.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Inserts a new student record.
    async fn insert_student(&self, student: &Student) -> Result<()>;

    /// Looks up a student by customer id.
    async fn find_student(&self, customer_id: &CustomerId) -> Result<Option<Student>>;

    /// Drains the wallet in a single conditional update.
    ///
    /// The balance is zeroed only when it is strictly positive and strictly
    /// below `charge`; the drained amount (the previous balance) is
    /// returned. In every other case (empty wallet, balance covering the
    /// full charge, unknown customer) nothing changes and `None` is
    /// returned. This is the checkout wallet-offset rule, executed where it
    /// cannot interleave with a concurrent debit.
    async fn drain_wallet_if_below(
        &self,
        customer_id: &CustomerId,
        charge: Money,
    ) -> Result<Option<Money>>;

    /// Atomically credits the wallet and returns the new balance, or `None`
    /// when no such student exists.
    async fn credit_wallet(
        &self,
        customer_id: &CustomerId,
        amount: Money,
    ) -> Result<Option<Money>>;
}

/// Access to the per-customer active cart.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Creates or replaces the customer's cart. At most one cart exists per
    /// customer.
    async fn upsert_cart(&self, cart: &Cart) -> Result<()>;

    /// Looks up the customer's active cart.
    async fn find_cart(&self, customer_id: &CustomerId) -> Result<Option<Cart>>;

    /// Deletes the customer's cart. Deleting an absent cart is not an error.
    async fn delete_cart(&self, customer_id: &CustomerId) -> Result<()>;
}

/// Access to the append-only payment records.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Appends a payment record. Payments are never updated.
    async fn insert_payment(&self, payment: &Payment) -> Result<()>;

    /// Returns the customer's most recent payment by creation time.
    async fn latest_payment(&self, customer_id: &CustomerId) -> Result<Option<Payment>>;
}

/// Access to orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order. Fails with [`crate::StoreError::DuplicateOrderId`]
    /// when the order id is already taken; callers retry with a fresh id.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Looks up an order by its human-readable id.
    async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// All orders for a customer, newest first.
    async fn orders_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>>;

    /// Every order in the system, newest first.
    async fn all_orders(&self) -> Result<Vec<Order>>;

    /// All orders assigned to a deliveryman, newest first.
    async fn orders_for_deliveryman(&self, deliveryman_id: DeliverymanId) -> Result<Vec<Order>>;

    /// Sets the order status, returning the updated order, or `None` when
    /// the order does not exist.
    async fn set_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>>;

    /// Sets the payment status recorded on the order, returning the updated
    /// order, or `None` when the order does not exist.
    async fn set_payment_status(
        &self,
        order_id: &OrderId,
        status: PaymentStatus,
    ) -> Result<Option<Order>>;

    /// Records the assigned deliveryman on the order, returning the updated
    /// order, or `None` when the order does not exist.
    async fn set_deliveryman(
        &self,
        order_id: &OrderId,
        deliveryman: &AssignedDeliveryman,
    ) -> Result<Option<Order>>;

    /// Bulk-completes stale orders: every order still `in process` created
    /// at or before `cutoff` becomes `done` in one statement. Returns the
    /// number of orders transitioned.
    async fn complete_stale_orders(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Access to the deliveryman directory.
#[async_trait]
pub trait DeliverymanStore: Send + Sync {
    /// Inserts a new deliveryman record.
    async fn insert_deliveryman(&self, deliveryman: &Deliveryman) -> Result<()>;

    /// Looks up a deliveryman by id.
    async fn find_deliveryman(&self, id: DeliverymanId) -> Result<Option<Deliveryman>>;

    /// Claims an available deliveryman in a single conditional update.
    ///
    /// Succeeds only when the deliveryman exists, is approved, and is
    /// currently `available`; the status transitions to `picking up an
    /// order` and the updated record is returned. Any other state returns
    /// `None` without changes, so two concurrent assignments can never both
    /// claim the same deliveryman.
    async fn claim_available(&self, id: DeliverymanId) -> Result<Option<Deliveryman>>;

    /// Sets the deliveryman's status, returning the updated record, or
    /// `None` when the deliveryman does not exist.
    async fn set_status(
        &self,
        id: DeliverymanId,
        status: DeliverymanStatus,
    ) -> Result<Option<Deliveryman>>;
}

/// Umbrella trait for a complete set of stores; implemented automatically
/// for anything providing all five collections.
pub trait Stores:
    StudentStore + CartStore + PaymentStore + OrderStore + DeliverymanStore
{
}

impl<T> Stores for T where
    T: StudentStore + CartStore + PaymentStore + OrderStore + DeliverymanStore
{
}
