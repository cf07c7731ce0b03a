use reqwest::StatusCode;
use tracing::{error, info, warn};

use crate::carrier::BostaClient;
use crate::carrier::api::{Envelope, PricingData, PricingTier};
use crate::cities;
use crate::error::CarrierError;
use crate::models::quote::{QUOTE_CURRENCY, ShippingQuote};

/// Fixed package parameters for storefront shipments.
const PACKAGE_SIZE: &str = "MEDIUM";
const SHIPMENT_TYPE: &str = "SEND";

impl BostaClient {
    /// Quote the cost of shipping between two cities.
    ///
    /// `Ok(None)` means "no quote available" and is an expected outcome:
    /// either city not being in the directory, or the carrier returning a
    /// shape we cannot price from, must never fail checkout. Auth and
    /// transport failures are real errors and propagate.
    pub async fn estimate(
        &self,
        pickup_city: &str,
        dropoff_city: &str,
        cod_amount: f64,
    ) -> Result<Option<ShippingQuote>, CarrierError> {
        let Some(pickup) = cities::normalize(pickup_city) else {
            warn!(city = pickup_city, "pickup city not in directory; no quote");
            return Ok(None);
        };
        let Some(dropoff) = cities::normalize(dropoff_city) else {
            warn!(city = dropoff_city, "drop-off city not in directory; no quote");
            return Ok(None);
        };

        let request = self
            .http
            .get(self.url("/pricing/shipment/calculator"))
            .query(&[
                ("cod", cod_amount.to_string().as_str()),
                ("pickupCity", pickup.name),
                ("dropOffCity", dropoff.name),
                ("size", PACKAGE_SIZE),
                ("type", SHIPMENT_TYPE),
            ]);

        let response = self.send_authed(request, "pricing").await?;
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            error!(status = %status, body = %body, "pricing request rejected; no quote");
            return Ok(None);
        }

        let envelope: Envelope<PricingData> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!(error = %err, body = %body, "malformed pricing response; no quote");
                return Ok(None);
            }
        };

        let tier = envelope.data.and_then(|data| data.tier);
        let quote = tier.as_ref().and_then(|tier| quote_from_tier(tier, cod_amount));
        match &quote {
            Some(quote) => {
                info!(
                    pickup = pickup.name,
                    dropoff = dropoff.name,
                    total = quote.total(),
                    "calculated shipping quote"
                );
            }
            None => {
                error!(body = %body, "pricing response missing tier cost; no quote");
            }
        }

        Ok(quote)
    }
}

/// Compose a quote from the carrier's pricing tier.
///
/// Total = base tier cost + opening-package fee + material fee + COD fee.
/// The COD fee applies only when collecting cash: a percentage of the COD
/// amount, floored at the carrier's minimum fee when one is given. A tier
/// without a base cost cannot be priced.
pub fn quote_from_tier(tier: &PricingTier, cod_amount: f64) -> Option<ShippingQuote> {
    let base_cost = tier.cost?;

    let opening_package_fee = tier
        .opening_package_fee
        .as_ref()
        .and_then(|fee| fee.amount)
        .unwrap_or(0.0);
    let material_fee = tier
        .bosta_material_fee
        .as_ref()
        .and_then(|fee| fee.amount)
        .unwrap_or(0.0);

    let cod_fee = if cod_amount > 0.0 {
        tier.extra_cod_fee
            .as_ref()
            .and_then(|fee| fee.percentage)
            .map(|percentage| {
                let amount = percentage * cod_amount;
                match tier.extra_cod_fee.as_ref().and_then(|fee| fee.minimum_fee_amount) {
                    Some(minimum) => amount.max(minimum),
                    None => amount,
                }
            })
            .unwrap_or(0.0)
    } else {
        0.0
    };

    Some(ShippingQuote {
        base_cost,
        opening_package_fee,
        material_fee,
        cod_fee,
        currency: QUOTE_CURRENCY,
    })
}
