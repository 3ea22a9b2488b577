//! HTTP API server for the cafeteria ordering backend.
//!
//! Wires the checkout, order, cancellation and assignment workflows into an
//! axum router with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use metrics_exporter_prometheus::PrometheusHandle;
use store::Stores;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use workflow::{AssignmentWorkflow, CancellationWorkflow, CheckoutWorkflow, OrderWorkflow};

use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Stores + Clone + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/api/payment", post(routes::payments::checkout::<S>))
        .route("/api/orders", post(routes::orders::create::<S>))
        .route("/api/orders/all-orders", get(routes::orders::all::<S>))
        .route(
            "/api/orders/deliveryman/{deliverymanId}",
            get(routes::orders::for_deliveryman::<S>),
        )
        .route("/api/orders/{customerId}", get(routes::orders::history::<S>))
        .route(
            "/api/orders/update-status/{orderId}",
            put(routes::orders::update_status::<S>),
        )
        .route(
            "/api/orders/update-payment/{orderId}",
            put(routes::orders::update_payment_status::<S>),
        )
        .route(
            "/api/orders/cancel-and-refund/{orderId}",
            put(routes::orders::cancel::<S>),
        )
        .route(
            "/api/orders/assign-deliveryman/{orderId}",
            put(routes::orders::assign_deliveryman::<S>),
        )
        .route(
            "/api/deliveryman/update-status/{id}",
            put(routes::deliverymen::update_status::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over an injected store set.
pub fn create_state<S: Stores + Clone + 'static>(stores: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        checkout: CheckoutWorkflow::new(stores.clone()),
        orders: OrderWorkflow::new(stores.clone()),
        cancellation: CancellationWorkflow::new(stores.clone()),
        assignment: AssignmentWorkflow::new(stores),
    })
}
