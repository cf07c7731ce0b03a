use serde::Serialize;

pub const QUOTE_CURRENCY: &str = "EGP";

/// One priced shipment estimate. Ephemeral: callers persist it if they need
/// to; this subsystem never does.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingQuote {
    pub base_cost: f64,
    pub opening_package_fee: f64,
    pub material_fee: f64,
    pub cod_fee: f64,
    pub currency: &'static str,
}

impl ShippingQuote {
    pub fn total(&self) -> f64 {
        self.base_cost + self.opening_package_fee + self.material_fee + self.cod_fee
    }
}
