use serde::{Deserialize, Serialize};

/// Outcome of a successful carrier delivery creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub tracking_number: String,
    pub delivery_id: String,
    /// Carrier-defined status string, e.g. "Pickup requested".
    pub status: Option<String>,
    pub status_code: Option<i64>,
}

/// Current carrier-side state of a shipment, as reported by the tracking
/// endpoint. Fields the carrier omits stay `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub tracking_number: Option<String>,
    pub status: Option<String>,
    pub status_code: Option<i64>,
    pub updated_at: Option<String>,
}

/// The merchant's registered shipment-origin address on file with the
/// carrier. Fetched, never created, by this gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickupLocation {
    pub location_id: String,
    pub location_name: String,
    pub is_default: bool,
    pub city: String,
    pub district: String,
    pub first_line: String,
    pub second_line: String,
    pub building_number: String,
    pub floor: String,
    pub apartment: String,
    pub zone_id: Option<String>,
}
