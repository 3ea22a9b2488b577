//! Deliveryman assignment and status updates.

use common::{DeliverymanId, OrderId};
use domain::{AssignedDeliveryman, DeliveryMethod, Deliveryman, DeliverymanStatus, Order};
use store::{DeliverymanStore, OrderStore};

use crate::error::{Result, WorkflowError};

/// Binds deliverymen to home-delivery orders.
pub struct AssignmentWorkflow<S> {
    stores: S,
}

impl<S> AssignmentWorkflow<S>
where
    S: OrderStore + DeliverymanStore,
{
    /// Creates the workflow over an injected store set.
    pub fn new(stores: S) -> Self {
        Self { stores }
    }

    /// Assigns a deliveryman to an order.
    ///
    /// Preconditions are checked in a fixed sequence and the first failure
    /// wins: order exists, order is home delivery, deliveryman exists,
    /// deliveryman is approved, deliveryman is available. The availability
    /// check is settled by an atomic claim (available → picking up an
    /// order), so the same deliveryman can never be booked onto two orders
    /// concurrently.
    #[tracing::instrument(skip(self), fields(%order_id, %deliveryman_id))]
    pub async fn assign(
        &self,
        order_id: &OrderId,
        deliveryman_id: DeliverymanId,
    ) -> Result<Order> {
        let order = self
            .stores
            .find_order(order_id)
            .await?
            .ok_or(WorkflowError::OrderNotFound)?;

        if order.delivery_method != DeliveryMethod::HomeDelivery {
            return Err(WorkflowError::NotHomeDelivery);
        }

        let deliveryman = self
            .stores
            .find_deliveryman(deliveryman_id)
            .await?
            .ok_or(WorkflowError::DeliverymanNotFound)?;

        if !deliveryman.approved {
            return Err(WorkflowError::DeliverymanNotApproved);
        }
        if deliveryman.status != DeliverymanStatus::Available {
            return Err(WorkflowError::DeliverymanNotAvailable);
        }

        // The read above can go stale; the claim is the authoritative check.
        let claimed = self
            .stores
            .claim_available(deliveryman_id)
            .await?
            .ok_or(WorkflowError::DeliverymanNotAvailable)?;

        let assigned = AssignedDeliveryman {
            id: claimed.id,
            name: claimed.name.clone(),
        };

        match self.stores.set_deliveryman(order_id, &assigned).await {
            Ok(Some(order)) => {
                metrics::counter!("deliveryman_assignments_total").increment(1);
                tracing::info!(deliveryman = %assigned.name, "deliveryman assigned");
                Ok(order)
            }
            Ok(None) => {
                self.release_claim(deliveryman_id).await;
                Err(WorkflowError::OrderNotFound)
            }
            Err(err) => {
                self.release_claim(deliveryman_id).await;
                Err(err.into())
            }
        }
    }

    /// Best-effort rollback of a claim whose order write failed.
    async fn release_claim(&self, deliveryman_id: DeliverymanId) {
        if let Err(error) = self
            .stores
            .set_status(deliveryman_id, DeliverymanStatus::Available)
            .await
        {
            tracing::warn!(%deliveryman_id, %error, "failed to release claimed deliveryman");
        }
    }

    /// Sets a deliveryman's availability status directly. This is the path
    /// delivery progress updates take (picking up → delivering → available).
    #[tracing::instrument(skip(self), fields(%deliveryman_id, %status))]
    pub async fn update_status(
        &self,
        deliveryman_id: DeliverymanId,
        status: DeliverymanStatus,
    ) -> Result<Deliveryman> {
        self.stores
            .set_status(deliveryman_id, status)
            .await?
            .ok_or(WorkflowError::DeliverymanNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{CustomerId, Money};
    use domain::{OrderStatus, PaymentMethod, PaymentStatus};
    use store::InMemoryStores;

    async fn seed_order(stores: &InMemoryStores, delivery_method: DeliveryMethod) -> OrderId {
        let order = Order {
            order_id: OrderId::new("123456"),
            customer_id: CustomerId::new("CUST-1"),
            customer_name: "Rahim".to_string(),
            phone: "01700000000".to_string(),
            address: "Hall 3".to_string(),
            items: vec![],
            total_price: Money::new(240),
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            order_status: OrderStatus::InProcess,
            delivery_method,
            delivery_charge: delivery_method.delivery_charge(),
            deliveryman: None,
            created_at: Utc::now(),
        };
        stores.insert_order(&order).await.unwrap();
        order.order_id
    }

    async fn seed_deliveryman(
        stores: &InMemoryStores,
        approved: bool,
        status: DeliverymanStatus,
    ) -> DeliverymanId {
        let deliveryman = Deliveryman {
            id: DeliverymanId::new(),
            name: "Karim".to_string(),
            email: "karim@example.com".to_string(),
            phone: "01800000000".to_string(),
            employee_id: "EMP-1".to_string(),
            approved,
            status,
        };
        stores.insert_deliveryman(&deliveryman).await.unwrap();
        deliveryman.id
    }

    #[tokio::test]
    async fn assignment_records_and_claims_the_deliveryman() {
        let stores = InMemoryStores::new();
        let order_id = seed_order(&stores, DeliveryMethod::HomeDelivery).await;
        let deliveryman_id =
            seed_deliveryman(&stores, true, DeliverymanStatus::Available).await;

        let order = AssignmentWorkflow::new(stores.clone())
            .assign(&order_id, deliveryman_id)
            .await
            .unwrap();

        let assigned = order.deliveryman.unwrap();
        assert_eq!(assigned.id, deliveryman_id);
        assert_eq!(assigned.name, "Karim");

        let claimed = stores
            .find_deliveryman(deliveryman_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(claimed.status, DeliverymanStatus::PickingUp);
    }

    #[tokio::test]
    async fn take_away_orders_are_not_assignable() {
        let stores = InMemoryStores::new();
        let order_id = seed_order(&stores, DeliveryMethod::TakeAway).await;
        let deliveryman_id =
            seed_deliveryman(&stores, true, DeliverymanStatus::Available).await;

        let err = AssignmentWorkflow::new(stores.clone())
            .assign(&order_id, deliveryman_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotHomeDelivery));
    }

    #[tokio::test]
    async fn each_failing_precondition_reports_its_own_error() {
        let stores = InMemoryStores::new();
        let order_id = seed_order(&stores, DeliveryMethod::HomeDelivery).await;
        let workflow = AssignmentWorkflow::new(stores.clone());

        let err = workflow
            .assign(&OrderId::new("999999"), DeliverymanId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::OrderNotFound));

        let err = workflow
            .assign(&order_id, DeliverymanId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DeliverymanNotFound));

        let unapproved =
            seed_deliveryman(&stores, false, DeliverymanStatus::Available).await;
        let err = workflow.assign(&order_id, unapproved).await.unwrap_err();
        assert!(matches!(err, WorkflowError::DeliverymanNotApproved));

        let busy = seed_deliveryman(&stores, true, DeliverymanStatus::Delivering).await;
        let err = workflow.assign(&order_id, busy).await.unwrap_err();
        assert!(matches!(err, WorkflowError::DeliverymanNotAvailable));

        // No precondition failure touched the order.
        let order = stores.find_order(&order_id).await.unwrap().unwrap();
        assert!(order.deliveryman.is_none());
    }

    #[tokio::test]
    async fn second_assignment_of_the_same_deliveryman_loses() {
        let stores = InMemoryStores::new();
        let first = seed_order(&stores, DeliveryMethod::HomeDelivery).await;
        let second = Order {
            order_id: OrderId::new("654321"),
            ..stores.find_order(&first).await.unwrap().unwrap()
        };
        stores.insert_order(&second).await.unwrap();
        let deliveryman_id =
            seed_deliveryman(&stores, true, DeliverymanStatus::Available).await;

        let workflow = AssignmentWorkflow::new(stores.clone());
        workflow.assign(&first, deliveryman_id).await.unwrap();

        let err = workflow
            .assign(&second.order_id, deliveryman_id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DeliverymanNotAvailable));

        let untouched = stores.find_order(&second.order_id).await.unwrap().unwrap();
        assert!(untouched.deliveryman.is_none());
    }

    #[tokio::test]
    async fn status_update_transitions_and_reports_missing_ids() {
        let stores = InMemoryStores::new();
        let deliveryman_id =
            seed_deliveryman(&stores, true, DeliverymanStatus::PickingUp).await;
        let workflow = AssignmentWorkflow::new(stores.clone());

        let updated = workflow
            .update_status(deliveryman_id, DeliverymanStatus::Delivering)
            .await
            .unwrap();
        assert_eq!(updated.status, DeliverymanStatus::Delivering);

        let err = workflow
            .update_status(DeliverymanId::new(), DeliverymanStatus::Available)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DeliverymanNotFound));
    }
}
