pub mod api;
pub mod carrier;
pub mod cities;
pub mod config;
pub mod error;
pub mod fulfillment;
pub mod models;
pub mod observability;
pub mod state;
