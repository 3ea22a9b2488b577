//! Deliveryman status endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::DeliverymanId;
use domain::{Deliveryman, DeliverymanStatus};
use serde::{Deserialize, Serialize};
use store::Stores;
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Deserialize)]
pub struct UpdateStatusBody {
    pub status: DeliverymanStatus,
}

#[derive(Serialize)]
pub struct UpdateStatusResponse {
    pub message: &'static str,
    pub deliveryman: Deliveryman,
}

/// PUT /api/deliveryman/update-status/:id — set a deliveryman's
/// availability (picking up → delivering → available).
#[tracing::instrument(skip(state, body))]
pub async fn update_status<S: Stores + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let deliveryman = state
        .assignment
        .update_status(DeliverymanId::from_uuid(id), body.status)
        .await
        .map_err(|e| ApiError::wrap(e, "Status update failed"))?;

    Ok(Json(UpdateStatusResponse {
        message: "Status updated successfully",
        deliveryman,
    }))
}
