use serde::{Deserialize, Serialize};

/// The order shape the storefront hands to this gateway. Amounts are in the
/// carrier's local currency (EGP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub items: Vec<LineItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total: f64,
    pub customer: CustomerContact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    #[serde(default)]
    pub building_number: String,
    #[serde(default)]
    pub floor: String,
    #[serde(default)]
    pub apartment: String,
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub postal_code: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cod,
    Stripe,
    Paymob,
}

impl PaymentMethod {
    pub fn is_cash_on_delivery(&self) -> bool {
        matches!(self, PaymentMethod::Cod)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Order {
    /// COD amount the courier should collect: the full order total for
    /// cash-on-delivery orders, zero for prepaid ones.
    pub fn cod_amount(&self) -> f64 {
        if self.payment_method.is_cash_on_delivery() {
            self.total
        } else {
            0.0
        }
    }

    /// Short package description from the first few item names, prefixed with
    /// the order reference.
    pub fn package_description(&self) -> String {
        let names: Vec<&str> = self
            .items
            .iter()
            .take(3)
            .map(|item| item.product_name.as_str())
            .collect();
        format!("Order #{} - {}", self.id, names.join(", "))
    }
}
