use dashmap::DashMap;

use crate::carrier::BostaClient;
use crate::fulfillment::FulfillmentRecord;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub client: BostaClient,
    pub fulfillments: DashMap<i64, FulfillmentRecord>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(client: BostaClient, metrics: Metrics) -> Self {
        Self {
            client,
            fulfillments: DashMap::new(),
            metrics,
        }
    }
}
