//! Order cancellation with a conditional partial wallet refund.

use common::{Money, OrderId};
use domain::{Order, OrderStatus, PaymentMethod, PaymentStatus};
use store::{OrderStore, StudentStore};

use crate::error::{Result, WorkflowError};

/// Fixed refund rate for settled mobile payments, in percent.
const REFUND_PERCENT: u32 = 40;

/// Refund issued alongside a cancellation.
#[derive(Debug, Clone)]
pub struct RefundDetails {
    /// Amount credited back to the wallet.
    pub wallet_refund: Money,
    /// Wallet balance after the credit.
    pub wallet: Money,
}

/// What cancellation produced.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub order: Order,
    /// Present only when the order was paid via Bkash.
    pub refund: Option<RefundDetails>,
}

/// Cancels orders and credits partial refunds.
pub struct CancellationWorkflow<S> {
    stores: S,
}

impl<S> CancellationWorkflow<S>
where
    S: OrderStore + StudentStore,
{
    /// Creates the workflow over an injected store set.
    pub fn new(stores: S) -> Self {
        Self { stores }
    }

    /// Cancels the order and, for settled Bkash payments, credits 40% of
    /// the total price back to the student's wallet.
    ///
    /// The refund is floored to a whole amount. A missing student record
    /// downgrades the result to a plain cancellation.
    #[tracing::instrument(skip(self), fields(%order_id))]
    pub async fn cancel(&self, order_id: &OrderId) -> Result<CancellationOutcome> {
        let order = self
            .stores
            .set_order_status(order_id, OrderStatus::Canceled)
            .await?
            .ok_or(WorkflowError::OrderNotFound)?;

        metrics::counter!("orders_canceled_total").increment(1);

        if order.payment_method == PaymentMethod::Bkash
            && order.payment_status == PaymentStatus::Paid
        {
            let refund = order.total_price.percent(REFUND_PERCENT);
            if let Some(wallet) = self.stores.credit_wallet(&order.customer_id, refund).await? {
                metrics::counter!("wallet_refunds_total").increment(1);
                tracing::info!(refund = refund.amount(), "wallet refunded on cancellation");
                return Ok(CancellationOutcome {
                    order,
                    refund: Some(RefundDetails {
                        wallet_refund: refund,
                        wallet,
                    }),
                });
            }
        }

        Ok(CancellationOutcome {
            order,
            refund: None,
        })
    }
}
