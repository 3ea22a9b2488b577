//! Delivery agents and their availability status.

use common::DeliverymanId;
use serde::{Deserialize, Serialize};

/// Availability of a deliveryman. Assignment requires `available`; the
/// assignment workflow transitions the claimed deliveryman to
/// `picking up an order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliverymanStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "picking up an order")]
    PickingUp,
    #[serde(rename = "delivering an order")]
    Delivering,
}

impl std::fmt::Display for DeliverymanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliverymanStatus::Available => write!(f, "available"),
            DeliverymanStatus::PickingUp => write!(f, "picking up an order"),
            DeliverymanStatus::Delivering => write!(f, "delivering an order"),
        }
    }
}

/// A delivery agent. `approved` is granted by the admin side of the system;
/// unapproved deliverymen cannot be assigned to orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deliveryman {
    pub id: DeliverymanId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub employee_id: String,
    pub approved: bool,
    pub status: DeliverymanStatus,
}
