//! Entity types for the cafeteria ordering backend.
//!
//! Everything here serializes to the camelCase JSON shapes the clients
//! already speak, including the literal enum values stored in the database
//! (`"CASH"`, `"Home Delivery"`, `"in process"`, ...).

pub mod cart;
pub mod deliveryman;
pub mod item;
pub mod order;
pub mod payment;
pub mod student;

pub use cart::{Cart, CartItem};
pub use deliveryman::{Deliveryman, DeliverymanStatus};
pub use item::LineItem;
pub use order::{AssignedDeliveryman, Order, OrderStatus};
pub use payment::{DeliveryMethod, Payment, PaymentMethod, PaymentStatus};
pub use student::Student;
