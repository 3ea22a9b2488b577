pub mod ids;
pub mod money;

pub use ids::{CustomerId, DeliverymanId, FoodItemId, OrderId, PaymentId};
pub use money::Money;
