use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use serde::Serialize;

use crate::cities;
use crate::error::ApiError;
use crate::models::delivery::PickupLocation;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cities", get(list_cities))
        .route("/pickup-location", get(get_pickup_location))
        .route("/pickup-location/refresh", post(refresh_pickup_location))
}

#[derive(Serialize)]
struct CityChoice {
    name: &'static str,
    name_ar: &'static str,
    code: &'static str,
}

/// Cities the carrier serves, for storefront address forms.
async fn list_cities() -> Json<Vec<CityChoice>> {
    let cities = cities::CITIES
        .iter()
        .map(|entry| CityChoice {
            name: entry.name,
            name_ar: entry.name_ar,
            code: entry.code,
        })
        .collect();

    Json(cities)
}

async fn get_pickup_location(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PickupLocation>, ApiError> {
    let location = state.client.default_location().await?;
    Ok(Json(location))
}

/// Drop the cached pickup location and re-fetch it from the carrier.
async fn refresh_pickup_location(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PickupLocation>, ApiError> {
    state.client.invalidate_pickup_cache().await;
    let location = state.client.default_location().await?;
    Ok(Json(location))
}
