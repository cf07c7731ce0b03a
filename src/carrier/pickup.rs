use reqwest::StatusCode;
use tracing::{info, warn};

use crate::carrier::BostaClient;
use crate::carrier::api::{Envelope, PickupLocationWire, PickupLocationsPage};
use crate::error::CarrierError;
use crate::models::delivery::PickupLocation;

impl BostaClient {
    /// The merchant's default shipment-origin address. Fetched once per
    /// client instance and cached; the merchant's pickup address rarely
    /// changes, so staleness within a process lifetime is acceptable.
    pub async fn default_location(&self) -> Result<PickupLocation, CarrierError> {
        let mut cache = self.pickup_cache.lock().await;
        if let Some(location) = cache.as_ref() {
            return Ok(location.clone());
        }

        let location = self.fetch_default_location().await?;
        *cache = Some(location.clone());
        Ok(location)
    }

    /// Drop the cached pickup location so the next call re-fetches it.
    pub async fn invalidate_pickup_cache(&self) {
        let mut cache = self.pickup_cache.lock().await;
        *cache = None;
    }

    async fn fetch_default_location(&self) -> Result<PickupLocation, CarrierError> {
        let response = self
            .send_authed(self.http.get(self.url("/pickup-locations")), "pickup_locations")
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CarrierError::Resolution(format!(
                "pickup locations fetch failed (status {status}): {body}"
            )));
        }

        let envelope: Envelope<PickupLocationsPage> = serde_json::from_str(&body)
            .map_err(|err| {
                CarrierError::Transport(format!("malformed pickup locations response: {err}"))
            })?;

        let mut list = envelope
            .data
            .and_then(|data| data.list)
            .unwrap_or_default();
        if list.is_empty() {
            return Err(CarrierError::Resolution(
                "no pickup locations registered with carrier".to_string(),
            ));
        }

        // Prefer the entry flagged as default; fall back to the first one.
        let chosen = match list.iter().position(|entry| entry.is_default) {
            Some(index) => index,
            None => {
                warn!("no pickup location flagged as default; using the first entry");
                0
            }
        };
        let entry = list.swap_remove(chosen);

        let location = from_wire(entry)?;
        info!(location = %location.location_name, "resolved default pickup location");
        Ok(location)
    }
}

fn from_wire(entry: PickupLocationWire) -> Result<PickupLocation, CarrierError> {
    let address = entry.address.ok_or_else(|| {
        CarrierError::Resolution("pickup location entry has no address".to_string())
    })?;

    Ok(PickupLocation {
        location_id: entry.id.unwrap_or_default(),
        location_name: entry.location_name.unwrap_or_else(|| "Unknown".to_string()),
        is_default: entry.is_default,
        city: address
            .city
            .and_then(|city| city.name)
            .unwrap_or_else(|| "Cairo".to_string()),
        district: address.district.unwrap_or_default(),
        first_line: address.first_line.unwrap_or_default(),
        second_line: address.second_line.unwrap_or_default(),
        building_number: address.building_number.unwrap_or_default(),
        floor: address.floor.unwrap_or_default(),
        apartment: address.apartment.unwrap_or_default(),
        zone_id: address.zone_id,
    })
}
