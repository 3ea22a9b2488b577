//! Order endpoints: creation, queries, field updates, cancellation and
//! deliveryman assignment.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::{CustomerId, DeliverymanId, Money, OrderId};
use domain::{Order, OrderStatus, PaymentStatus};
use serde::{Deserialize, Serialize};
use store::Stores;
use uuid::Uuid;
use workflow::CreateOrderRequest;

use crate::error::ApiError;
use crate::routes::AppState;

// -- Request types --

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    pub customer_id: String,
    pub customer_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusBody {
    pub order_status: OrderStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentStatusBody {
    pub payment_status: PaymentStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDeliverymanBody {
    pub deliveryman_id: Uuid,
}

// -- Response types --

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub message: &'static str,
    pub order_id: OrderId,
}

#[derive(Serialize)]
pub struct UpdatedOrderResponse {
    pub message: &'static str,
    pub updated: Order,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_refund: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<Money>,
}

#[derive(Serialize)]
pub struct AssignmentResponse {
    pub message: &'static str,
    pub order: Order,
}

// -- Handlers --

/// POST /api/orders — create an order from the latest payment.
#[tracing::instrument(skip(state, body), fields(customer_id = %body.customer_id))]
pub async fn create<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(body): Json<CreateOrderBody>,
) -> Result<Json<OrderCreatedResponse>, ApiError> {
    let order_id = state
        .orders
        .create(CreateOrderRequest {
            customer_id: CustomerId::new(body.customer_id),
            customer_name: body.customer_name,
        })
        .await
        .map_err(|e| ApiError::wrap(e, "Failed to create order"))?;

    Ok(Json(OrderCreatedResponse {
        message: "Order created",
        order_id,
    }))
}

/// GET /api/orders/:customerId — the customer's order history, newest first.
#[tracing::instrument(skip(state))]
pub async fn history<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .orders
        .history(&CustomerId::new(customer_id))
        .await
        .map_err(|e| ApiError::wrap(e, "Failed to fetch order history"))?;
    Ok(Json(orders))
}

/// GET /api/orders/all-orders — every order, newest first.
#[tracing::instrument(skip(state))]
pub async fn all<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .orders
        .all()
        .await
        .map_err(|e| ApiError::wrap(e, "Failed to fetch orders"))?;
    Ok(Json(orders))
}

/// GET /api/orders/deliveryman/:deliverymanId — assigned orders, newest
/// first.
#[tracing::instrument(skip(state))]
pub async fn for_deliveryman<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(deliveryman_id): Path<Uuid>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .orders
        .for_deliveryman(DeliverymanId::from_uuid(deliveryman_id))
        .await
        .map_err(|e| ApiError::wrap(e, "Failed to fetch deliveryman orders"))?;
    Ok(Json(orders))
}

/// PUT /api/orders/update-status/:orderId — set the order status.
#[tracing::instrument(skip(state, body))]
pub async fn update_status<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
    Json(body): Json<UpdateOrderStatusBody>,
) -> Result<Json<UpdatedOrderResponse>, ApiError> {
    let updated = state
        .orders
        .update_status(&OrderId::new(order_id), body.order_status)
        .await
        .map_err(|e| ApiError::wrap(e, "Update failed"))?;

    Ok(Json(UpdatedOrderResponse {
        message: "Order status updated",
        updated,
    }))
}

/// PUT /api/orders/update-payment/:orderId — set the payment status.
#[tracing::instrument(skip(state, body))]
pub async fn update_payment_status<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
    Json(body): Json<UpdatePaymentStatusBody>,
) -> Result<Json<UpdatedOrderResponse>, ApiError> {
    let updated = state
        .orders
        .update_payment_status(&OrderId::new(order_id), body.payment_status)
        .await
        .map_err(|e| ApiError::wrap(e, "Update failed"))?;

    Ok(Json(UpdatedOrderResponse {
        message: "Payment status updated",
        updated,
    }))
}

/// PUT /api/orders/cancel-and-refund/:orderId — cancel, refunding 40% of
/// settled Bkash payments to the wallet.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
) -> Result<Json<CancellationResponse>, ApiError> {
    let outcome = state
        .cancellation
        .cancel(&OrderId::new(order_id))
        .await
        .map_err(|e| ApiError::wrap(e, "Cancellation failed"))?;

    let response = match outcome.refund {
        Some(refund) => CancellationResponse {
            message: "Order canceled and wallet refunded 40%",
            wallet_refund: Some(refund.wallet_refund),
            wallet: Some(refund.wallet),
        },
        None => CancellationResponse {
            message: "Order canceled (no refund needed)",
            wallet_refund: None,
            wallet: None,
        },
    };
    Ok(Json(response))
}

/// PUT /api/orders/assign-deliveryman/:orderId — bind a deliveryman to a
/// home-delivery order.
#[tracing::instrument(skip(state, body))]
pub async fn assign_deliveryman<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
    Json(body): Json<AssignDeliverymanBody>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let order = state
        .assignment
        .assign(
            &OrderId::new(order_id),
            DeliverymanId::from_uuid(body.deliveryman_id),
        )
        .await
        .map_err(|e| ApiError::wrap(e, "Failed to assign deliveryman"))?;

    Ok(Json(AssignmentResponse {
        message: "Deliveryman assigned successfully",
        order,
    }))
}
