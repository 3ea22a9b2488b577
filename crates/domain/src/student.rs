//! Students and their stored wallet balance.

use common::{CustomerId, Money};
use serde::{Deserialize, Serialize};

/// A registered student. The wallet balance offsets checkout charges and
/// receives cancellation refunds; it is never observably negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub customer_id: CustomerId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub wallet: Money,
}

impl Student {
    /// Phone number for an order, with the fixed placeholder when absent.
    pub fn contact_phone(&self) -> String {
        self.phone
            .clone()
            .unwrap_or_else(|| "0000000000".to_string())
    }

    /// Delivery address for an order, with the fixed placeholder when absent.
    pub fn contact_address(&self) -> String {
        self.address
            .clone()
            .unwrap_or_else(|| "Default Address".to_string())
    }
}
