//! Fulfillment policy on top of the carrier client.
//!
//! Order placement is never failed by carrier trouble: a rejected or
//! unreachable delivery creation leaves a `PendingRetry` record for an
//! operator instead of rolling back the checkout. Likewise, cancelling an
//! order locally always succeeds even when the carrier-side cancellation
//! does not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::models::delivery::DeliveryResult;
use crate::models::order::Order;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FulfillmentStatus {
    /// Carrier delivery exists; status updates arrive from the carrier.
    Created,
    /// Delivery creation failed; needs manual follow-up or retry.
    PendingRetry,
    /// Order cancelled locally. The carrier-side delivery may or may not
    /// have been terminated; `carrier_error` records a failed termination.
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentRecord {
    pub order_id: i64,
    pub order: Order,
    pub status: FulfillmentStatus,
    pub delivery: Option<DeliveryResult>,
    pub carrier_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attempt carrier delivery creation for an order and record the outcome.
pub async fn create_for_order(state: &AppState, order: Order) -> FulfillmentRecord {
    let order_id = order.id;
    let now = Utc::now();

    let record = match state.client.create_delivery(&order).await {
        Ok(delivery) => {
            state
                .metrics
                .fulfillments_total
                .with_label_values(&["created"])
                .inc();
            FulfillmentRecord {
                order_id,
                order,
                status: FulfillmentStatus::Created,
                delivery: Some(delivery),
                carrier_error: None,
                created_at: now,
                updated_at: now,
            }
        }
        Err(err) => {
            error!(order_id, error = %err, "delivery creation failed; marking for retry");
            state
                .metrics
                .fulfillments_total
                .with_label_values(&["pending_retry"])
                .inc();
            FulfillmentRecord {
                order_id,
                order,
                status: FulfillmentStatus::PendingRetry,
                delivery: None,
                carrier_error: Some(err.to_string()),
                created_at: now,
                updated_at: now,
            }
        }
    };

    state.fulfillments.insert(order_id, record.clone());
    record
}

/// Re-attempt delivery creation for a pending-retry record.
pub async fn retry(state: &AppState, order_id: i64) -> Result<FulfillmentRecord, ApiError> {
    let record = state
        .fulfillments
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| ApiError::NotFound(format!("no fulfillment for order {order_id}")))?;

    if record.status != FulfillmentStatus::PendingRetry {
        return Err(ApiError::BadRequest(format!(
            "fulfillment for order {order_id} is not pending retry"
        )));
    }

    // A revoked token is a common reason the first attempt failed; probe
    // identity so the retry starts from a known-good session.
    if let Err(err) = state.client.check_identity().await {
        warn!(order_id, error = %err, "identity probe failed before retry");
    }

    Ok(create_for_order(state, record.order).await)
}

/// Cancel an order locally, attempting carrier-side termination first.
///
/// A failed carrier cancellation never blocks the local one; the failure is
/// logged and kept on the record so an operator can follow up.
pub async fn cancel_order(state: &AppState, order_id: i64) -> Result<FulfillmentRecord, ApiError> {
    let mut record = state
        .fulfillments
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| ApiError::NotFound(format!("no fulfillment for order {order_id}")))?;

    if let Some(delivery) = &record.delivery {
        match state.client.cancel_delivery(&delivery.delivery_id).await {
            Ok(()) => {
                record.carrier_error = None;
            }
            Err(err) => {
                warn!(
                    order_id,
                    delivery_id = %delivery.delivery_id,
                    error = %err,
                    "carrier cancellation failed; proceeding with local cancellation"
                );
                record.carrier_error = Some(err.to_string());
            }
        }
    }

    record.status = FulfillmentStatus::Cancelled;
    record.updated_at = Utc::now();
    state
        .metrics
        .fulfillments_total
        .with_label_values(&["cancelled"])
        .inc();
    state.fulfillments.insert(order_id, record.clone());

    info!(order_id, "order fulfillment cancelled");
    Ok(record)
}
