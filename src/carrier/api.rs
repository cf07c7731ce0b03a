//! Wire types for the Bosta v2 API. Parsed once at the boundary; everything
//! the carrier may omit or rename is an `Option` here so the client code can
//! decide what is mandatory per operation.

use serde::{Deserialize, Serialize};

/// Standard Bosta response envelope. `success` and `message` are not always
/// present, and some endpoints put the payload straight under `data`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub struct LoginData {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupLocationsPage {
    pub list: Option<Vec<PickupLocationWire>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupLocationWire {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub location_name: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    pub address: Option<PickupAddressWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupAddressWire {
    pub city: Option<CityRef>,
    pub district: Option<String>,
    pub first_line: Option<String>,
    pub second_line: Option<String>,
    pub building_number: Option<String>,
    pub floor: Option<String>,
    pub apartment: Option<String>,
    pub zone_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CityRef {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitiesPage {
    pub list: Option<Vec<CityWire>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityWire {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub name_ar: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictWire {
    pub district_id: Option<String>,
    pub district_name: Option<String>,
    pub zone_id: Option<String>,
    #[serde(default)]
    pub pickup_availability: bool,
    #[serde(default)]
    pub drop_off_availability: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingData {
    pub tier: Option<PricingTier>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingTier {
    pub cost: Option<f64>,
    pub opening_package_fee: Option<Fee>,
    pub bosta_material_fee: Option<Fee>,
    pub extra_cod_fee: Option<CodFee>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodFee {
    /// Fraction of the COD amount, e.g. 0.01 for 1%.
    pub percentage: Option<f64>,
    pub minimum_fee_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryData {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub tracking_number: Option<String>,
    pub state: Option<DeliveryState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryState {
    pub value: Option<String>,
    pub code: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingData {
    pub tracking_number: Option<String>,
    pub state: Option<DeliveryState>,
    pub updated_at: Option<String>,
}

// Outbound payloads.

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeliveryRequest {
    #[serde(rename = "type")]
    pub delivery_type: u8,
    pub specs: PackageSpecs,
    pub notes: String,
    pub cod: f64,
    pub drop_off_address: DeliveryAddress,
    pub pickup_address: DeliveryAddress,
    pub return_address: DeliveryAddress,
    pub business_reference: String,
    pub unique_business_reference: String,
    pub receiver: Receiver,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Bosta's delivery type discriminant for a forward (send) shipment.
pub const DELIVERY_TYPE_SEND: u8 = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpecs {
    pub package_type: &'static str,
    pub size: &'static str,
    pub package_details: PackageDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetails {
    pub items_count: usize,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub city: String,
    pub district_id: String,
    pub zone_id: String,
    pub first_line: String,
    pub second_line: String,
    pub building_number: String,
    pub floor: String,
    pub apartment: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}
