//! Line items snapshotted into payments and orders.

use common::{FoodItemId, Money};
use serde::{Deserialize, Serialize};

/// A priced line item, as snapshotted into a payment at checkout and copied
/// verbatim into the order created from that payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Reference back to the menu item, when the cart carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_item_id: Option<FoodItemId>,
    pub name: String,
    pub price: Money,
    pub quantity: u32,
}

impl LineItem {
    /// Total price for this line (unit price times quantity).
    pub fn line_total(&self) -> Money {
        Money::new(self.price.amount() * i64::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies_price_by_quantity() {
        let item = LineItem {
            food_item_id: None,
            name: "Chicken Khichuri".to_string(),
            price: Money::new(120),
            quantity: 3,
        };
        assert_eq!(item.line_total(), Money::new(360));
    }

    #[test]
    fn serializes_camel_case_and_omits_missing_reference() {
        let item = LineItem {
            food_item_id: None,
            name: "Singara".to_string(),
            price: Money::new(10),
            quantity: 4,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["name"], "Singara");
        assert_eq!(json["price"], 10);
        assert_eq!(json["quantity"], 4);
        assert!(json.get("foodItemId").is_none());
    }
}
