//! The in-progress item selection a student builds before checkout.

use common::{CustomerId, FoodItemId, Money};
use serde::{Deserialize, Serialize};

use crate::item::LineItem;

/// One entry in a cart.
///
/// Carts are written by the cart-management side of the system against a
/// schemaless store, so every field beyond the food-item reference may be
/// absent. [`CartItem::snapshot`] substitutes safe defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_item_id: Option<FoodItemId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Money>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl CartItem {
    /// Freezes this cart entry into a payment line item.
    ///
    /// Missing fields become safe defaults instead of failing the checkout:
    /// name `"Unknown Item"`, quantity 1, price 0.
    pub fn snapshot(&self) -> LineItem {
        LineItem {
            food_item_id: self.food_item_id,
            name: self
                .name
                .clone()
                .unwrap_or_else(|| "Unknown Item".to_string()),
            price: self.price.unwrap_or_else(Money::zero),
            quantity: self.quantity.unwrap_or(1),
        }
    }
}

/// A student's active cart. At most one exists per customer at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub customer_id: CustomerId,
    pub items: Vec<CartItem>,
    pub total_price: Money,
}

impl Cart {
    /// True when the cart holds no items and is not eligible for checkout.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
