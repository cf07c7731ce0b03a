use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::quote::ShippingQuote;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/quotes", post(create_quote))
}

#[derive(Deserialize)]
pub struct QuoteRequest {
    pub pickup_city: String,
    pub dropoff_city: String,
    #[serde(default)]
    pub cod_amount: f64,
}

/// "No quote" is a normal answer, not an error; checkout falls back to a
/// manual shipping fee when `available` is false.
#[derive(Serialize)]
pub struct QuoteResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuoteBody>,
}

#[derive(Serialize)]
pub struct QuoteBody {
    pub base_cost: f64,
    pub opening_package_fee: f64,
    pub material_fee: f64,
    pub cod_fee: f64,
    pub total: f64,
    pub currency: &'static str,
}

impl From<ShippingQuote> for QuoteBody {
    fn from(quote: ShippingQuote) -> Self {
        Self {
            total: quote.total(),
            base_cost: quote.base_cost,
            opening_package_fee: quote.opening_package_fee,
            material_fee: quote.material_fee,
            cod_fee: quote.cod_fee,
            currency: quote.currency,
        }
    }
}

async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, ApiError> {
    if payload.cod_amount < 0.0 {
        return Err(ApiError::BadRequest("cod_amount cannot be negative".to_string()));
    }

    let quote = state
        .client
        .estimate(&payload.pickup_city, &payload.dropoff_city, payload.cod_amount)
        .await?;

    let outcome = if quote.is_some() { "available" } else { "unavailable" };
    state
        .metrics
        .quotes_total
        .with_label_values(&[outcome])
        .inc();

    Ok(Json(QuoteResponse {
        available: quote.is_some(),
        quote: quote.map(QuoteBody::from),
    }))
}
