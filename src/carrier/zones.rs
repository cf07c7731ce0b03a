use reqwest::StatusCode;
use tracing::{debug, info};

use crate::carrier::BostaClient;
use crate::carrier::api::{CitiesPage, CityWire, DistrictWire, Envelope};
use crate::cities;
use crate::error::CarrierError;

impl BostaClient {
    /// Map a city name to the carrier's `(zone_id, district_id)` pair.
    ///
    /// Two-hop lookup: the carrier has no flattened city-to-district table,
    /// so this fetches the city list first and then the districts of the
    /// matched city. Both ids are mandatory on delivery-creation payloads.
    pub async fn resolve_zone_district(
        &self,
        city_name: &str,
    ) -> Result<(String, String), CarrierError> {
        // Never call the carrier with a city we do not recognize.
        let entry = cities::normalize(city_name).ok_or_else(|| {
            CarrierError::Resolution(format!("unknown city: {city_name}"))
        })?;

        let city_id = self.find_city_id(entry).await?;
        debug!(city = entry.name, city_id = %city_id, "matched carrier city");

        let districts = self.fetch_districts(&city_id).await?;
        let district = districts
            .into_iter()
            .find(|d| d.pickup_availability && d.drop_off_availability)
            .ok_or_else(|| {
                CarrierError::Resolution(format!(
                    "no district with pickup and drop-off availability in {}",
                    entry.name
                ))
            })?;

        let zone_id = district.zone_id.ok_or_else(|| {
            CarrierError::Resolution(format!("district in {} has no zone id", entry.name))
        })?;
        let district_id = district.district_id.ok_or_else(|| {
            CarrierError::Resolution(format!("district in {} has no district id", entry.name))
        })?;

        info!(city = entry.name, zone_id = %zone_id, district_id = %district_id, "resolved zone and district");
        Ok((zone_id, district_id))
    }

    async fn find_city_id(&self, entry: &cities::CityEntry) -> Result<String, CarrierError> {
        let response = self
            .send_authed(self.http.get(self.url("/cities")), "cities")
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CarrierError::Resolution(format!(
                "cities fetch failed (status {status}): {body}"
            )));
        }

        let envelope: Envelope<CitiesPage> = serde_json::from_str(&body)
            .map_err(|err| CarrierError::Transport(format!("malformed cities response: {err}")))?;

        let list = envelope.data.and_then(|data| data.list).unwrap_or_default();
        let matched = list.into_iter().find(|city| matches_entry(city, entry));

        matched
            .and_then(|city| city.id)
            .ok_or_else(|| {
                CarrierError::Resolution(format!("carrier does not list city {}", entry.name))
            })
    }

    async fn fetch_districts(&self, city_id: &str) -> Result<Vec<DistrictWire>, CarrierError> {
        let response = self
            .send_authed(
                self.http.get(self.url(&format!("/cities/{city_id}/districts"))),
                "districts",
            )
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CarrierError::Resolution(format!(
                "districts fetch failed (status {status}): {body}"
            )));
        }

        let envelope: Envelope<Vec<DistrictWire>> = serde_json::from_str(&body).map_err(|err| {
            CarrierError::Transport(format!("malformed districts response: {err}"))
        })?;

        Ok(envelope.data.unwrap_or_default())
    }
}

/// Carrier city entries match on name, Arabic name, or city code,
/// case-insensitively.
fn matches_entry(city: &CityWire, entry: &cities::CityEntry) -> bool {
    let by_name = city
        .name
        .as_deref()
        .is_some_and(|name| name.eq_ignore_ascii_case(entry.name));
    let by_name_ar = city.name_ar.as_deref() == Some(entry.name_ar);
    let by_code = city
        .code
        .as_deref()
        .is_some_and(|code| code.eq_ignore_ascii_case(entry.code));

    by_name || by_name_ar || by_code
}
