//! Payment records and the enums shared with orders.

use chrono::{DateTime, Utc};
use common::{CustomerId, Money, PaymentId};
use serde::{Deserialize, Serialize};

use crate::item::LineItem;

/// How the student pays. The wire values are the literals the clients and
/// the stored documents already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "CASH")]
    Cash,
    #[serde(rename = "Bkash")]
    Bkash,
}

impl PaymentMethod {
    /// Status assumed when the caller does not supply one: cash is settled
    /// at the counter, mobile payments start unpaid.
    pub fn default_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Cash => PaymentStatus::Paid,
            PaymentMethod::Bkash => PaymentStatus::Unpaid,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "CASH"),
            PaymentMethod::Bkash => write!(f, "Bkash"),
        }
    }
}

/// Whether the charge has been settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Unpaid => write!(f, "Unpaid"),
        }
    }
}

/// How the order reaches the student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMethod {
    #[serde(rename = "Take-away")]
    TakeAway,
    #[serde(rename = "Home Delivery")]
    HomeDelivery,
}

impl DeliveryMethod {
    /// Fixed surcharge for home delivery; take-away is free.
    pub fn delivery_charge(&self) -> Money {
        match self {
            DeliveryMethod::TakeAway => Money::zero(),
            DeliveryMethod::HomeDelivery => Money::new(40),
        }
    }
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMethod::TakeAway => write!(f, "Take-away"),
            DeliveryMethod::HomeDelivery => write!(f, "Home Delivery"),
        }
    }
}

/// Immutable record of a completed checkout.
///
/// `amount` is the charge after any wallet offset. Multiple payments may
/// exist per customer; the most recent one is the join key for order
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub customer_id: CustomerId,
    pub method: PaymentMethod,
    pub amount: Money,
    pub payment_status: PaymentStatus,
    pub delivery_method: DeliveryMethod,
    pub delivery_charge: Money,
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
}
