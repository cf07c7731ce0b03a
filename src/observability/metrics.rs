use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub carrier_requests_total: IntCounterVec,
    pub carrier_logins_total: IntCounter,
    pub quotes_total: IntCounterVec,
    pub fulfillments_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let carrier_requests_total = IntCounterVec::new(
            Opts::new(
                "carrier_requests_total",
                "Outbound carrier API requests by endpoint and outcome",
            ),
            &["endpoint", "outcome"],
        )
        .expect("valid carrier_requests_total metric");

        let carrier_logins_total = IntCounter::new(
            "carrier_logins_total",
            "Total carrier login attempts",
        )
        .expect("valid carrier_logins_total metric");

        let quotes_total = IntCounterVec::new(
            Opts::new("quotes_total", "Shipping quote requests by outcome"),
            &["outcome"],
        )
        .expect("valid quotes_total metric");

        let fulfillments_total = IntCounterVec::new(
            Opts::new("fulfillments_total", "Delivery fulfillment attempts by outcome"),
            &["outcome"],
        )
        .expect("valid fulfillments_total metric");

        registry
            .register(Box::new(carrier_requests_total.clone()))
            .expect("register carrier_requests_total");
        registry
            .register(Box::new(carrier_logins_total.clone()))
            .expect("register carrier_logins_total");
        registry
            .register(Box::new(quotes_total.clone()))
            .expect("register quotes_total");
        registry
            .register(Box::new(fulfillments_total.clone()))
            .expect("register fulfillments_total");

        Self {
            registry,
            carrier_requests_total,
            carrier_logins_total,
            quotes_total,
            fulfillments_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
