use chrono::Utc;
use reqwest::StatusCode;
use tracing::info;

use crate::carrier::BostaClient;
use crate::carrier::api::{
    CreateDeliveryData, CreateDeliveryRequest, DELIVERY_TYPE_SEND, DeliveryAddress, Envelope,
    PackageDetails, PackageSpecs, Receiver, TrackingData,
};
use crate::error::CarrierError;
use crate::models::delivery::{DeliveryResult, PickupLocation, TrackingStatus};
use crate::models::order::Order;

impl BostaClient {
    /// Create a carrier-side delivery for an application order.
    ///
    /// The drop-off city is resolved to zone/district ids before anything is
    /// sent; an unresolvable address aborts without creating a delivery.
    pub async fn create_delivery(&self, order: &Order) -> Result<DeliveryResult, CarrierError> {
        // Carrier payloads want the canonical city spelling, not whatever
        // variant the customer typed.
        let dropoff_city = crate::cities::normalize(&order.shipping_address.city)
            .map(|entry| entry.name)
            .ok_or_else(|| {
                CarrierError::Resolution(format!(
                    "unknown drop-off city: {}",
                    order.shipping_address.city
                ))
            })?;

        let pickup = self.default_location().await?;
        let (pickup_zone, pickup_district) = self.resolve_zone_district(&pickup.city).await?;
        let (dropoff_zone, dropoff_district) = self.resolve_zone_district(dropoff_city).await?;

        let payload = build_payload(
            order,
            dropoff_city,
            &pickup,
            (pickup_zone, pickup_district),
            (dropoff_zone, dropoff_district),
            self.config().webhook_url.clone(),
        );

        let request = self.http.post(self.url("/deliveries")).json(&payload);
        let response = self.send_authed(request, "create_delivery").await?;

        let status = response.status();
        let body = response.text().await?;
        // The carrier is inconsistent about returning 200 vs 201 on success.
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(CarrierError::Creation {
                message: format!("carrier returned status {status}"),
                body,
            });
        }

        let envelope: Envelope<CreateDeliveryData> =
            serde_json::from_str(&body).map_err(|err| {
                CarrierError::Transport(format!("malformed delivery response: {err}"))
            })?;

        if envelope.success == Some(false) {
            return Err(CarrierError::Creation {
                message: envelope
                    .message
                    .unwrap_or_else(|| "carrier reported failure".to_string()),
                body,
            });
        }

        let data = envelope.data.ok_or_else(|| CarrierError::Creation {
            message: "delivery response has no data".to_string(),
            body: body.clone(),
        })?;

        let tracking_number = data.tracking_number.ok_or_else(|| CarrierError::Creation {
            message: "delivery response has no tracking number".to_string(),
            body: body.clone(),
        })?;
        let delivery_id = data.id.ok_or_else(|| CarrierError::Creation {
            message: "delivery response has no delivery id".to_string(),
            body: body.clone(),
        })?;

        let result = DeliveryResult {
            tracking_number,
            delivery_id,
            status: data.state.as_ref().and_then(|s| s.value.clone()),
            status_code: data.state.as_ref().and_then(|s| s.code),
        };

        info!(
            order_id = order.id,
            tracking_number = %result.tracking_number,
            delivery_id = %result.delivery_id,
            "created carrier delivery"
        );
        Ok(result)
    }

    /// Terminate a delivery before physical pickup. Success is a 200 with a
    /// true `success` flag; anything else is surfaced for the operator.
    pub async fn cancel_delivery(&self, delivery_id: &str) -> Result<(), CarrierError> {
        let request = self
            .http
            .delete(self.url(&format!("/deliveries/business/{delivery_id}/terminate")));
        let response = self.send_authed(request, "terminate_delivery").await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CarrierError::Cancellation {
                message: format!("carrier returned status {status}"),
                body,
            });
        }

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|err| {
                CarrierError::Transport(format!("malformed termination response: {err}"))
            })?;

        if envelope.success == Some(true) {
            info!(delivery_id, "cancelled carrier delivery");
            Ok(())
        } else {
            Err(CarrierError::Cancellation {
                message: envelope
                    .message
                    .unwrap_or_else(|| "unknown carrier error".to_string()),
                body,
            })
        }
    }

    pub async fn track_delivery(
        &self,
        tracking_number: &str,
    ) -> Result<TrackingStatus, CarrierError> {
        let request = self
            .http
            .get(self.url(&format!("/deliveries/tracking/{tracking_number}")));
        let response = self.send_authed(request, "tracking").await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CarrierError::Tracking {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<TrackingData> = serde_json::from_str(&body)
            .map_err(|err| CarrierError::Transport(format!("malformed tracking response: {err}")))?;

        let data = envelope.data.ok_or_else(|| CarrierError::Tracking {
            status: status.as_u16(),
            body,
        })?;

        Ok(TrackingStatus {
            tracking_number: data.tracking_number,
            status: data.state.as_ref().and_then(|s| s.value.clone()),
            status_code: data.state.as_ref().and_then(|s| s.code),
            updated_at: data.updated_at,
        })
    }
}

fn build_payload(
    order: &Order,
    dropoff_city: &str,
    pickup: &PickupLocation,
    (pickup_zone, pickup_district): (String, String),
    (dropoff_zone, dropoff_district): (String, String),
    webhook_url: Option<String>,
) -> CreateDeliveryRequest {
    let address = &order.shipping_address;
    let (first_name, last_name) = split_receiver_name(&order.customer.name);

    let pickup_address = DeliveryAddress {
        city: pickup.city.clone(),
        district_id: pickup_district,
        zone_id: pickup_zone,
        first_line: pickup.first_line.clone(),
        second_line: pickup.second_line.clone(),
        building_number: pickup.building_number.clone(),
        floor: pickup.floor.clone(),
        apartment: pickup.apartment.clone(),
    };
    // Undeliverable packages go back to the pickup location.
    let return_address = DeliveryAddress {
        city: pickup_address.city.clone(),
        district_id: pickup_address.district_id.clone(),
        zone_id: pickup_address.zone_id.clone(),
        first_line: pickup_address.first_line.clone(),
        second_line: pickup_address.second_line.clone(),
        building_number: pickup_address.building_number.clone(),
        floor: pickup_address.floor.clone(),
        apartment: pickup_address.apartment.clone(),
    };

    CreateDeliveryRequest {
        delivery_type: DELIVERY_TYPE_SEND,
        specs: PackageSpecs {
            package_type: "Parcel",
            size: "MEDIUM",
            package_details: PackageDetails {
                items_count: order.items.len(),
                description: order.package_description(),
            },
        },
        notes: format!("Order #{}", order.id),
        cod: order.cod_amount(),
        drop_off_address: DeliveryAddress {
            city: dropoff_city.to_string(),
            district_id: dropoff_district,
            zone_id: dropoff_zone,
            first_line: address.street.clone(),
            second_line: address.district.clone(),
            building_number: address.building_number.clone(),
            floor: address.floor.clone(),
            apartment: address.apartment.clone(),
        },
        pickup_address,
        return_address,
        business_reference: format!("order_{}", order.id),
        // Timestamp suffix keeps retried creations from tripping the
        // carrier's duplicate-reference rejection.
        unique_business_reference: format!("order_{}_{}", order.id, Utc::now().timestamp()),
        receiver: Receiver {
            first_name,
            last_name,
            phone: order.customer.phone.clone(),
            email: order.customer.email.clone(),
        },
        webhook_url,
    }
}

/// Split a full name into first/last at the first whitespace run.
fn split_receiver_name(name: &str) -> (String, String) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}
