//! The fulfillment record derived from a payment.

use chrono::{DateTime, Utc};
use common::{CustomerId, DeliverymanId, Money, OrderId};
use serde::{Deserialize, Serialize};

use crate::item::LineItem;
use crate::payment::{DeliveryMethod, PaymentMethod, PaymentStatus};

/// Order lifecycle. `in process` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "in process")]
    InProcess,
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "canceled")]
    Canceled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::InProcess => write!(f, "in process"),
            OrderStatus::Done => write!(f, "done"),
            OrderStatus::Canceled => write!(f, "canceled"),
        }
    }
}

/// The deliveryman bound to a home-delivery order. The name is snapshotted
/// at assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedDeliveryman {
    #[serde(rename = "deliverymanId")]
    pub id: DeliverymanId,
    #[serde(rename = "deliverymanName")]
    pub name: String,
}

/// A fulfillment record. Item, price and customer fields are immutable after
/// creation; only `order_status`, `payment_status` and the deliveryman
/// assignment change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub items: Vec<LineItem>,
    pub total_price: Money,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub delivery_method: DeliveryMethod,
    pub delivery_charge: Money,
    #[serde(flatten)]
    pub deliveryman: Option<AssignedDeliveryman>,
    pub created_at: DateTime<Utc>,
}
