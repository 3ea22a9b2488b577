//! In-memory store implementation for tests.
//!
//! Mirrors the conditional-update semantics of the PostgreSQL
//! implementation under a single process-wide lock.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CustomerId, DeliverymanId, Money, OrderId};
use domain::{
    AssignedDeliveryman, Cart, Deliveryman, DeliverymanStatus, Order, OrderStatus, Payment,
    PaymentStatus, Student,
};
use tokio::sync::RwLock;

use crate::traits::{CartStore, DeliverymanStore, OrderStore, PaymentStore, StudentStore};
use crate::{Result, StoreError};

#[derive(Default)]
struct State {
    students: HashMap<CustomerId, Student>,
    carts: HashMap<CustomerId, Cart>,
    payments: Vec<Payment>,
    orders: Vec<Order>,
    deliverymen: HashMap<DeliverymanId, Deliveryman>,
}

/// In-memory implementation of all five store traits.
#[derive(Clone, Default)]
pub struct InMemoryStores {
    inner: Arc<RwLock<State>>,
}

impl InMemoryStores {
    /// Creates a new empty store set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of persisted payments.
    pub async fn payment_count(&self) -> usize {
        self.inner.read().await.payments.len()
    }

    /// Returns the number of persisted orders.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[async_trait]
impl StudentStore for InMemoryStores {
    async fn insert_student(&self, student: &Student) -> Result<()> {
        self.inner
            .write()
            .await
            .students
            .insert(student.customer_id.clone(), student.clone());
        Ok(())
    }

    async fn find_student(&self, customer_id: &CustomerId) -> Result<Option<Student>> {
        Ok(self.inner.read().await.students.get(customer_id).cloned())
    }

    async fn drain_wallet_if_below(
        &self,
        customer_id: &CustomerId,
        charge: Money,
    ) -> Result<Option<Money>> {
        let mut state = self.inner.write().await;
        let Some(student) = state.students.get_mut(customer_id) else {
            return Ok(None);
        };
        if student.wallet.is_positive() && student.wallet < charge {
            let drained = student.wallet;
            student.wallet = Money::zero();
            Ok(Some(drained))
        } else {
            Ok(None)
        }
    }

    async fn credit_wallet(
        &self,
        customer_id: &CustomerId,
        amount: Money,
    ) -> Result<Option<Money>> {
        let mut state = self.inner.write().await;
        let Some(student) = state.students.get_mut(customer_id) else {
            return Ok(None);
        };
        student.wallet += amount;
        Ok(Some(student.wallet))
    }
}

#[async_trait]
impl CartStore for InMemoryStores {
    async fn upsert_cart(&self, cart: &Cart) -> Result<()> {
        self.inner
            .write()
            .await
            .carts
            .insert(cart.customer_id.clone(), cart.clone());
        Ok(())
    }

    async fn find_cart(&self, customer_id: &CustomerId) -> Result<Option<Cart>> {
        Ok(self.inner.read().await.carts.get(customer_id).cloned())
    }

    async fn delete_cart(&self, customer_id: &CustomerId) -> Result<()> {
        self.inner.write().await.carts.remove(customer_id);
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for InMemoryStores {
    async fn insert_payment(&self, payment: &Payment) -> Result<()> {
        self.inner.write().await.payments.push(payment.clone());
        Ok(())
    }

    async fn latest_payment(&self, customer_id: &CustomerId) -> Result<Option<Payment>> {
        let state = self.inner.read().await;
        let mut candidates: Vec<&Payment> = state
            .payments
            .iter()
            .filter(|p| &p.customer_id == customer_id)
            .collect();
        candidates.sort_by_key(|p| p.created_at);
        Ok(candidates.last().map(|p| (*p).clone()))
    }
}

#[async_trait]
impl OrderStore for InMemoryStores {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut state = self.inner.write().await;
        if state.orders.iter().any(|o| o.order_id == order.order_id) {
            return Err(StoreError::DuplicateOrderId(order.order_id.clone()));
        }
        state.orders.push(order.clone());
        Ok(())
    }

    async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let state = self.inner.read().await;
        Ok(state.orders.iter().find(|o| &o.order_id == order_id).cloned())
    }

    async fn orders_for_customer(&self, customer_id: &CustomerId) -> Result<Vec<Order>> {
        let state = self.inner.read().await;
        Ok(newest_first(
            state
                .orders
                .iter()
                .filter(|o| &o.customer_id == customer_id)
                .cloned()
                .collect(),
        ))
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let state = self.inner.read().await;
        Ok(newest_first(state.orders.clone()))
    }

    async fn orders_for_deliveryman(&self, deliveryman_id: DeliverymanId) -> Result<Vec<Order>> {
        let state = self.inner.read().await;
        Ok(newest_first(
            state
                .orders
                .iter()
                .filter(|o| {
                    o.deliveryman
                        .as_ref()
                        .is_some_and(|d| d.id == deliveryman_id)
                })
                .cloned()
                .collect(),
        ))
    }

    async fn set_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>> {
        let mut state = self.inner.write().await;
        let Some(order) = state.orders.iter_mut().find(|o| &o.order_id == order_id) else {
            return Ok(None);
        };
        order.order_status = status;
        Ok(Some(order.clone()))
    }

    async fn set_payment_status(
        &self,
        order_id: &OrderId,
        status: PaymentStatus,
    ) -> Result<Option<Order>> {
        let mut state = self.inner.write().await;
        let Some(order) = state.orders.iter_mut().find(|o| &o.order_id == order_id) else {
            return Ok(None);
        };
        order.payment_status = status;
        Ok(Some(order.clone()))
    }

    async fn set_deliveryman(
        &self,
        order_id: &OrderId,
        deliveryman: &AssignedDeliveryman,
    ) -> Result<Option<Order>> {
        let mut state = self.inner.write().await;
        let Some(order) = state.orders.iter_mut().find(|o| &o.order_id == order_id) else {
            return Ok(None);
        };
        order.deliveryman = Some(deliveryman.clone());
        Ok(Some(order.clone()))
    }

    async fn complete_stale_orders(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut state = self.inner.write().await;
        let mut transitioned = 0;
        for order in state
            .orders
            .iter_mut()
            .filter(|o| o.order_status == OrderStatus::InProcess && o.created_at <= cutoff)
        {
            order.order_status = OrderStatus::Done;
            transitioned += 1;
        }
        Ok(transitioned)
    }
}

#[async_trait]
impl DeliverymanStore for InMemoryStores {
    async fn insert_deliveryman(&self, deliveryman: &Deliveryman) -> Result<()> {
        self.inner
            .write()
            .await
            .deliverymen
            .insert(deliveryman.id, deliveryman.clone());
        Ok(())
    }

    async fn find_deliveryman(&self, id: DeliverymanId) -> Result<Option<Deliveryman>> {
        Ok(self.inner.read().await.deliverymen.get(&id).cloned())
    }

    async fn claim_available(&self, id: DeliverymanId) -> Result<Option<Deliveryman>> {
        let mut state = self.inner.write().await;
        let Some(deliveryman) = state.deliverymen.get_mut(&id) else {
            return Ok(None);
        };
        if deliveryman.approved && deliveryman.status == DeliverymanStatus::Available {
            deliveryman.status = DeliverymanStatus::PickingUp;
            Ok(Some(deliveryman.clone()))
        } else {
            Ok(None)
        }
    }

    async fn set_status(
        &self,
        id: DeliverymanId,
        status: DeliverymanStatus,
    ) -> Result<Option<Deliveryman>> {
        let mut state = self.inner.write().await;
        let Some(deliveryman) = state.deliverymen.get_mut(&id) else {
            return Ok(None);
        };
        deliveryman.status = status;
        Ok(Some(deliveryman.clone()))
    }
}
