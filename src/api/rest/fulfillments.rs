use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};

use crate::error::ApiError;
use crate::fulfillment::{self, FulfillmentRecord, FulfillmentStatus};
use crate::models::delivery::TrackingStatus;
use crate::models::order::Order;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/fulfillments", post(create_fulfillment))
        .route(
            "/fulfillments/:order_id",
            get(get_fulfillment).delete(cancel_fulfillment),
        )
        .route("/fulfillments/:order_id/retry", post(retry_fulfillment))
        .route("/tracking/:tracking_number", get(track))
}

/// 201 when the carrier delivery was created, 202 when the order was
/// accepted but delivery creation is pending retry.
async fn create_fulfillment(
    State(state): State<Arc<AppState>>,
    Json(order): Json<Order>,
) -> Result<(StatusCode, Json<FulfillmentRecord>), ApiError> {
    if order.items.is_empty() {
        return Err(ApiError::BadRequest("order has no items".to_string()));
    }
    if state.fulfillments.contains_key(&order.id) {
        return Err(ApiError::BadRequest(format!(
            "order {} already has a fulfillment",
            order.id
        )));
    }

    let record = fulfillment::create_for_order(&state, order).await;
    let status = match record.status {
        FulfillmentStatus::Created => StatusCode::CREATED,
        _ => StatusCode::ACCEPTED,
    };
    Ok((status, Json(record)))
}

async fn get_fulfillment(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
) -> Result<Json<FulfillmentRecord>, ApiError> {
    let record = state
        .fulfillments
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| ApiError::NotFound(format!("no fulfillment for order {order_id}")))?;

    Ok(Json(record))
}

async fn retry_fulfillment(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
) -> Result<Json<FulfillmentRecord>, ApiError> {
    let record = fulfillment::retry(&state, order_id).await?;
    Ok(Json(record))
}

async fn cancel_fulfillment(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
) -> Result<Json<FulfillmentRecord>, ApiError> {
    let record = fulfillment::cancel_order(&state, order_id).await?;
    Ok(Json(record))
}

async fn track(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackingStatus>, ApiError> {
    let status = state.client.track_delivery(&tracking_number).await?;
    Ok(Json(status))
}
