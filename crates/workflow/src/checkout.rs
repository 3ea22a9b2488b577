//! Checkout: converts a cart into a persisted payment and clears the cart.

use chrono::Utc;
use common::{CustomerId, Money, PaymentId};
use domain::{DeliveryMethod, Payment, PaymentMethod, PaymentStatus};
use store::{CartStore, PaymentStore, StudentStore};

use crate::error::{Result, WorkflowError};

/// Checkout input, as supplied by the client.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_id: CustomerId,
    pub method: PaymentMethod,
    /// Settlement state reported by the client; defaulted per method when
    /// absent (cash is paid at the counter, Bkash starts unpaid).
    pub payment_status: Option<PaymentStatus>,
    pub delivery_method: DeliveryMethod,
}

/// What checkout produced: the payment record and the wallet movement.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub payment: Payment,
    /// Amount drawn from the wallet; zero when the offset did not fire.
    pub wallet_used: Money,
    /// Wallet balance after checkout.
    pub updated_wallet: Money,
}

/// Converts a cart plus a payment method into an immutable payment record.
pub struct CheckoutWorkflow<S> {
    stores: S,
}

impl<S> CheckoutWorkflow<S>
where
    S: CartStore + StudentStore + PaymentStore,
{
    /// Creates the workflow over an injected store set.
    pub fn new(stores: S) -> Self {
        Self { stores }
    }

    /// Runs a checkout for the given customer.
    ///
    /// The wallet offset fires only when the balance is positive and
    /// strictly below the full charge, in which case the whole balance is
    /// drawn. A wallet that covers the charge entirely is left untouched.
    #[tracing::instrument(
        skip(self, request),
        fields(customer_id = %request.customer_id, method = %request.method)
    )]
    pub async fn process(&self, request: CheckoutRequest) -> Result<CheckoutOutcome> {
        let cart = self
            .stores
            .find_cart(&request.customer_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(WorkflowError::EmptyCart)?;

        let student = self
            .stores
            .find_student(&request.customer_id)
            .await?
            .ok_or(WorkflowError::StudentNotFound)?;

        let delivery_charge = request.delivery_method.delivery_charge();
        let mut final_amount = cart.total_price + delivery_charge;

        let wallet_used = self
            .stores
            .drain_wallet_if_below(&request.customer_id, final_amount)
            .await?
            .unwrap_or_else(Money::zero);
        final_amount -= wallet_used;
        let updated_wallet = if wallet_used.is_positive() {
            Money::zero()
        } else {
            student.wallet
        };

        // The wallet offset settles before the mobile-payment gate; a
        // rejected Bkash checkout does not restore the drained balance.
        if request.method == PaymentMethod::Bkash
            && request.payment_status != Some(PaymentStatus::Paid)
        {
            return Err(WorkflowError::MobilePaymentIncomplete);
        }

        let payment = Payment {
            id: PaymentId::new(),
            customer_id: request.customer_id.clone(),
            method: request.method,
            amount: final_amount,
            payment_status: request
                .payment_status
                .unwrap_or_else(|| request.method.default_status()),
            delivery_method: request.delivery_method,
            delivery_charge,
            items: cart.items.iter().map(|item| item.snapshot()).collect(),
            created_at: Utc::now(),
        };

        self.stores.insert_payment(&payment).await?;
        self.stores.delete_cart(&request.customer_id).await?;

        metrics::counter!("checkout_payments_total").increment(1);
        tracing::info!(
            amount = payment.amount.amount(),
            wallet_used = wallet_used.amount(),
            "checkout complete"
        );

        Ok(CheckoutOutcome {
            payment,
            wallet_used,
            updated_wallet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Cart, CartItem, Student};
    use store::InMemoryStores;

    async fn seed(stores: &InMemoryStores, wallet: i64, cart_total: i64) {
        stores
            .insert_student(&Student {
                customer_id: CustomerId::new("CUST-1"),
                name: "Rahim".to_string(),
                email: "rahim@example.edu".to_string(),
                student_id: None,
                phone: Some("01700000000".to_string()),
                address: Some("Hall 3".to_string()),
                wallet: Money::new(wallet),
            })
            .await
            .unwrap();
        stores
            .upsert_cart(&Cart {
                customer_id: CustomerId::new("CUST-1"),
                items: vec![CartItem {
                    food_item_id: None,
                    name: Some("Khichuri".to_string()),
                    price: Some(Money::new(cart_total)),
                    quantity: Some(1),
                }],
                total_price: Money::new(cart_total),
            })
            .await
            .unwrap();
    }

    fn cash_request(delivery_method: DeliveryMethod) -> CheckoutRequest {
        CheckoutRequest {
            customer_id: CustomerId::new("CUST-1"),
            method: PaymentMethod::Cash,
            payment_status: None,
            delivery_method,
        }
    }

    #[tokio::test]
    async fn take_away_with_empty_wallet_charges_cart_total() {
        let stores = InMemoryStores::new();
        seed(&stores, 0, 200).await;

        let outcome = CheckoutWorkflow::new(stores.clone())
            .process(cash_request(DeliveryMethod::TakeAway))
            .await
            .unwrap();

        assert_eq!(outcome.payment.amount, Money::new(200));
        assert_eq!(outcome.payment.delivery_charge, Money::zero());
        assert!(outcome.wallet_used.is_zero());
        assert!(outcome.updated_wallet.is_zero());
    }

    #[tokio::test]
    async fn home_delivery_drains_insufficient_wallet() {
        let stores = InMemoryStores::new();
        seed(&stores, 100, 200).await;

        let outcome = CheckoutWorkflow::new(stores.clone())
            .process(cash_request(DeliveryMethod::HomeDelivery))
            .await
            .unwrap();

        // 200 + 40 delivery = 240; the 100 wallet drains in full.
        assert_eq!(outcome.payment.amount, Money::new(140));
        assert_eq!(outcome.payment.delivery_charge, Money::new(40));
        assert_eq!(outcome.wallet_used, Money::new(100));
        assert!(outcome.updated_wallet.is_zero());

        let wallet = stores
            .find_student(&CustomerId::new("CUST-1"))
            .await
            .unwrap()
            .unwrap()
            .wallet;
        assert!(wallet.is_zero());
    }

    #[tokio::test]
    async fn full_wallet_coverage_is_not_debited() {
        let stores = InMemoryStores::new();
        seed(&stores, 500, 200).await;

        let outcome = CheckoutWorkflow::new(stores.clone())
            .process(cash_request(DeliveryMethod::TakeAway))
            .await
            .unwrap();

        // Balance covers the whole charge, so the offset never fires.
        assert_eq!(outcome.payment.amount, Money::new(200));
        assert!(outcome.wallet_used.is_zero());
        assert_eq!(outcome.updated_wallet, Money::new(500));
    }

    #[tokio::test]
    async fn empty_cart_never_creates_a_payment() {
        let stores = InMemoryStores::new();
        seed(&stores, 0, 200).await;
        stores
            .upsert_cart(&Cart {
                customer_id: CustomerId::new("CUST-1"),
                items: vec![],
                total_price: Money::zero(),
            })
            .await
            .unwrap();

        let err = CheckoutWorkflow::new(stores.clone())
            .process(cash_request(DeliveryMethod::TakeAway))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyCart));
        assert_eq!(stores.payment_count().await, 0);
    }

    #[tokio::test]
    async fn missing_cart_never_creates_a_payment() {
        let stores = InMemoryStores::new();

        let err = CheckoutWorkflow::new(stores.clone())
            .process(cash_request(DeliveryMethod::TakeAway))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::EmptyCart));
        assert_eq!(stores.payment_count().await, 0);
    }

    #[tokio::test]
    async fn unpaid_bkash_is_rejected() {
        let stores = InMemoryStores::new();
        seed(&stores, 0, 200).await;

        let err = CheckoutWorkflow::new(stores.clone())
            .process(CheckoutRequest {
                customer_id: CustomerId::new("CUST-1"),
                method: PaymentMethod::Bkash,
                payment_status: Some(PaymentStatus::Unpaid),
                delivery_method: DeliveryMethod::TakeAway,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::MobilePaymentIncomplete));
        assert_eq!(stores.payment_count().await, 0);

        // The cart survives a rejected checkout.
        assert!(
            stores
                .find_cart(&CustomerId::new("CUST-1"))
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn cash_defaults_to_paid_and_clears_the_cart() {
        let stores = InMemoryStores::new();
        seed(&stores, 0, 200).await;

        let outcome = CheckoutWorkflow::new(stores.clone())
            .process(cash_request(DeliveryMethod::TakeAway))
            .await
            .unwrap();

        assert_eq!(outcome.payment.payment_status, PaymentStatus::Paid);
        assert!(
            stores
                .find_cart(&CustomerId::new("CUST-1"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn item_snapshot_substitutes_safe_defaults() {
        let stores = InMemoryStores::new();
        seed(&stores, 0, 50).await;
        stores
            .upsert_cart(&Cart {
                customer_id: CustomerId::new("CUST-1"),
                items: vec![CartItem::default()],
                total_price: Money::new(50),
            })
            .await
            .unwrap();

        let outcome = CheckoutWorkflow::new(stores.clone())
            .process(cash_request(DeliveryMethod::TakeAway))
            .await
            .unwrap();

        let item = &outcome.payment.items[0];
        assert_eq!(item.name, "Unknown Item");
        assert_eq!(item.quantity, 1);
        assert!(item.price.is_zero());
    }
}
