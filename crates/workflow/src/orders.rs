//! Order creation from the latest payment, plus queries and field updates.

use chrono::Utc;
use common::{CustomerId, DeliverymanId, OrderId};
use domain::{Order, OrderStatus, PaymentStatus};
use rand::Rng;
use store::{OrderStore, PaymentStore, StoreError, StudentStore};

use crate::error::{Result, WorkflowError};

/// How many random ids to try before giving up. The id space holds 900 000
/// values, so collisions this deep mean something is very wrong.
const ORDER_ID_ATTEMPTS: u32 = 8;

/// Order creation input.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub customer_id: CustomerId,
    pub customer_name: String,
}

/// Creates orders from payments and serves order queries and updates.
pub struct OrderWorkflow<S> {
    stores: S,
}

impl<S> OrderWorkflow<S>
where
    S: OrderStore + PaymentStore + StudentStore,
{
    /// Creates the workflow over an injected store set.
    pub fn new(stores: S) -> Self {
        Self { stores }
    }

    fn random_order_id() -> OrderId {
        let n: u32 = rand::rng().random_range(100_000..1_000_000);
        OrderId::new(n.to_string())
    }

    /// Creates an order from the customer's most recent payment.
    ///
    /// The item snapshot, total, payment and delivery fields come from the
    /// payment; phone and address come from the student record, with fixed
    /// placeholders when absent. The store enforces order-id uniqueness and
    /// the insert retries with a fresh id on collision.
    #[tracing::instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn create(&self, request: CreateOrderRequest) -> Result<OrderId> {
        let payment = self
            .stores
            .latest_payment(&request.customer_id)
            .await?
            .ok_or(WorkflowError::PaymentNotFound)?;

        let student = self
            .stores
            .find_student(&request.customer_id)
            .await?
            .ok_or(WorkflowError::StudentNotFound)?;

        for attempt in 0..ORDER_ID_ATTEMPTS {
            let order = Order {
                order_id: Self::random_order_id(),
                customer_id: request.customer_id.clone(),
                customer_name: request.customer_name.clone(),
                phone: student.contact_phone(),
                address: student.contact_address(),
                items: payment.items.clone(),
                total_price: payment.amount,
                payment_method: payment.method,
                payment_status: payment.payment_status,
                order_status: OrderStatus::InProcess,
                delivery_method: payment.delivery_method,
                delivery_charge: payment.delivery_charge,
                deliveryman: None,
                created_at: Utc::now(),
            };

            match self.stores.insert_order(&order).await {
                Ok(()) => {
                    metrics::counter!("orders_created_total").increment(1);
                    tracing::info!(order_id = %order.order_id, "order created");
                    return Ok(order.order_id);
                }
                Err(StoreError::DuplicateOrderId(id)) => {
                    tracing::warn!(%id, attempt, "order id collision, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(WorkflowError::OrderIdSpaceExhausted)
    }

    /// A customer's orders, newest first.
    pub async fn history(&self, customer_id: &CustomerId) -> Result<Vec<Order>> {
        Ok(self.stores.orders_for_customer(customer_id).await?)
    }

    /// Every order, newest first.
    pub async fn all(&self) -> Result<Vec<Order>> {
        Ok(self.stores.all_orders().await?)
    }

    /// Orders assigned to a deliveryman, newest first.
    pub async fn for_deliveryman(&self, deliveryman_id: DeliverymanId) -> Result<Vec<Order>> {
        Ok(self.stores.orders_for_deliveryman(deliveryman_id).await?)
    }

    /// Sets the order status and returns the updated order.
    #[tracing::instrument(skip(self), fields(%order_id))]
    pub async fn update_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order> {
        self.stores
            .set_order_status(order_id, status)
            .await?
            .ok_or(WorkflowError::OrderNotFound)
    }

    /// Sets the payment status recorded on the order and returns the
    /// updated order.
    #[tracing::instrument(skip(self), fields(%order_id))]
    pub async fn update_payment_status(
        &self,
        order_id: &OrderId,
        status: PaymentStatus,
    ) -> Result<Order> {
        self.stores
            .set_payment_status(order_id, status)
            .await?
            .ok_or(WorkflowError::OrderNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Money, PaymentId};
    use domain::{DeliveryMethod, LineItem, Payment, PaymentMethod, Student};
    use store::InMemoryStores;

    fn student(phone: Option<&str>, address: Option<&str>) -> Student {
        Student {
            customer_id: CustomerId::new("CUST-1"),
            name: "Rahim".to_string(),
            email: "rahim@example.edu".to_string(),
            student_id: None,
            phone: phone.map(String::from),
            address: address.map(String::from),
            wallet: Money::zero(),
        }
    }

    fn payment(amount: i64, created_at: chrono::DateTime<Utc>) -> Payment {
        Payment {
            id: PaymentId::new(),
            customer_id: CustomerId::new("CUST-1"),
            method: PaymentMethod::Bkash,
            amount: Money::new(amount),
            payment_status: PaymentStatus::Paid,
            delivery_method: DeliveryMethod::HomeDelivery,
            delivery_charge: Money::new(40),
            items: vec![LineItem {
                food_item_id: None,
                name: "Khichuri".to_string(),
                price: Money::new(100),
                quantity: 2,
            }],
            created_at,
        }
    }

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            customer_id: CustomerId::new("CUST-1"),
            customer_name: "Rahim".to_string(),
        }
    }

    #[tokio::test]
    async fn order_copies_the_latest_payment_snapshot() {
        let stores = InMemoryStores::new();
        stores.insert_student(&student(None, None)).await.unwrap();
        let base = Utc::now();
        stores.insert_payment(&payment(100, base)).await.unwrap();
        let latest = payment(240, base + chrono::Duration::seconds(5));
        stores.insert_payment(&latest).await.unwrap();

        let workflow = OrderWorkflow::new(stores.clone());
        let order_id = workflow.create(request()).await.unwrap();

        let order = stores.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.items, latest.items);
        assert_eq!(order.total_price, Money::new(240));
        assert_eq!(order.payment_method, PaymentMethod::Bkash);
        assert_eq!(order.order_status, OrderStatus::InProcess);
        assert_eq!(order.delivery_charge, Money::new(40));
    }

    #[tokio::test]
    async fn order_id_is_six_digits() {
        let stores = InMemoryStores::new();
        stores.insert_student(&student(None, None)).await.unwrap();
        stores.insert_payment(&payment(100, Utc::now())).await.unwrap();

        let order_id = OrderWorkflow::new(stores).create(request()).await.unwrap();
        assert_eq!(order_id.as_str().len(), 6);
        assert!(order_id.as_str().chars().all(|c| c.is_ascii_digit()));
        assert_ne!(order_id.as_str().chars().next(), Some('0'));
    }

    #[tokio::test]
    async fn placeholders_fill_missing_contact_fields() {
        let stores = InMemoryStores::new();
        stores.insert_student(&student(None, None)).await.unwrap();
        stores.insert_payment(&payment(100, Utc::now())).await.unwrap();

        let workflow = OrderWorkflow::new(stores.clone());
        let order_id = workflow.create(request()).await.unwrap();

        let order = stores.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.phone, "0000000000");
        assert_eq!(order.address, "Default Address");
    }

    #[tokio::test]
    async fn missing_payment_or_student_fails_without_an_order() {
        let stores = InMemoryStores::new();

        let workflow = OrderWorkflow::new(stores.clone());
        let err = workflow.create(request()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::PaymentNotFound));

        stores.insert_payment(&payment(100, Utc::now())).await.unwrap();
        let err = workflow.create(request()).await.unwrap_err();
        assert!(matches!(err, WorkflowError::StudentNotFound));
        assert_eq!(stores.order_count().await, 0);
    }

    #[tokio::test]
    async fn status_updates_hit_existing_orders_only() {
        let stores = InMemoryStores::new();
        stores.insert_student(&student(None, None)).await.unwrap();
        stores.insert_payment(&payment(100, Utc::now())).await.unwrap();
        let workflow = OrderWorkflow::new(stores.clone());
        let order_id = workflow.create(request()).await.unwrap();

        let updated = workflow
            .update_status(&order_id, OrderStatus::Done)
            .await
            .unwrap();
        assert_eq!(updated.order_status, OrderStatus::Done);

        let updated = workflow
            .update_payment_status(&order_id, PaymentStatus::Unpaid)
            .await
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Unpaid);

        let err = workflow
            .update_status(&OrderId::new("000000"), OrderStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::OrderNotFound));
    }
}
