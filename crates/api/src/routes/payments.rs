//! Checkout endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use common::{CustomerId, Money};
use domain::{DeliveryMethod, Payment, PaymentMethod, PaymentStatus};
use serde::{Deserialize, Serialize};
use store::Stores;
use workflow::CheckoutRequest;

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutBody {
    pub customer_id: String,
    pub method: PaymentMethod,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    pub delivery_method: DeliveryMethod,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub message: String,
    pub payment: Payment,
    pub refund_used: bool,
    pub wallet_used_amount: Money,
    pub updated_wallet: Money,
}

/// POST /api/payment — convert the customer's cart into a payment record.
#[tracing::instrument(skip(state, body), fields(customer_id = %body.customer_id))]
pub async fn checkout<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<CheckoutBody>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let outcome = state
        .checkout
        .process(CheckoutRequest {
            customer_id: CustomerId::new(body.customer_id),
            method: body.method,
            payment_status: body.payment_status,
            delivery_method: body.delivery_method,
        })
        .await
        .map_err(|e| ApiError::wrap(e, "Payment failed"))?;

    Ok(Json(CheckoutResponse {
        message: format!("Payment successful via {}", outcome.payment.method),
        refund_used: outcome.wallet_used.is_positive(),
        wallet_used_amount: outcome.wallet_used,
        updated_wallet: outcome.updated_wallet,
        payment: outcome.payment,
    }))
}
