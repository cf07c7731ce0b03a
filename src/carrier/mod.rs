pub mod api;
pub mod deliveries;
pub mod pickup;
pub mod pricing;
pub mod zones;

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::carrier::api::{Envelope, LoginData, LoginRequest};
use crate::config::CarrierConfig;
use crate::error::CarrierError;
use crate::models::delivery::PickupLocation;
use crate::observability::metrics::Metrics;

/// Client for the Bosta v2 API. One instance per composition root; the
/// bearer token and the default pickup location are cached on the instance,
/// so tests can construct isolated clients.
pub struct BostaClient {
    http: reqwest::Client,
    config: CarrierConfig,
    auth: Mutex<AuthState>,
    pickup_cache: Mutex<Option<PickupLocation>>,
    metrics: Metrics,
}

#[derive(Default)]
struct AuthState {
    token: Option<String>,
    expires_at: Option<Instant>,
}

impl AuthState {
    fn valid_token(&self) -> Option<&str> {
        let token = self.token.as_deref()?;
        let expires_at = self.expires_at?;
        if Instant::now() < expires_at {
            Some(token)
        } else {
            None
        }
    }
}

impl BostaClient {
    pub fn new(mut config: CarrierConfig, metrics: Metrics) -> Result<Self, CarrierError> {
        while config.base_url.ends_with('/') {
            config.base_url.pop();
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| CarrierError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            config,
            auth: Mutex::new(AuthState::default()),
            pickup_cache: Mutex::new(None),
            metrics,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    pub(crate) fn config(&self) -> &CarrierConfig {
        &self.config
    }

    /// Return a valid bearer token, logging in first if the cached one is
    /// missing or expired. The auth lock is held across the login call, so
    /// concurrent callers await a single in-flight refresh instead of
    /// issuing duplicate logins.
    pub async fn ensure_token(&self) -> Result<String, CarrierError> {
        if let Some(key) = &self.config.api_key {
            return Ok(key.clone());
        }

        let mut auth = self.auth.lock().await;
        if let Some(token) = auth.valid_token() {
            return Ok(token.to_string());
        }

        let token = self.login().await?;
        auth.token = Some(token.clone());
        auth.expires_at = Some(Instant::now() + Duration::from_secs(self.config.token_ttl_secs));
        Ok(token)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate_token(&self) {
        let mut auth = self.auth.lock().await;
        auth.token = None;
        auth.expires_at = None;
    }

    async fn login(&self) -> Result<String, CarrierError> {
        debug!(email = %self.config.email, "logging in to carrier");
        self.metrics.carrier_logins_total.inc();

        let response = self
            .http
            .post(self.url("/users/login"))
            .json(&LoginRequest {
                email: &self.config.email,
                password: &self.config.password,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CarrierError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope<LoginData> = serde_json::from_str(&body)
            .map_err(|err| CarrierError::Transport(format!("malformed login response: {err}")))?;

        let raw = envelope
            .data
            .and_then(|data| data.token)
            .ok_or_else(|| CarrierError::Auth {
                status: status.as_u16(),
                body,
            })?;

        // The carrier sometimes returns the token with the scheme baked in.
        let token = raw.strip_prefix("Bearer").unwrap_or(&raw).trim().to_string();
        info!("carrier login succeeded");
        Ok(token)
    }

    /// Lightweight authenticated probe. A 401 means the cached token was
    /// revoked server-side; re-login once and re-probe.
    pub async fn check_identity(&self) -> Result<(), CarrierError> {
        let token = self.ensure_token().await?;
        let response = self
            .http
            .get(self.url("/users/me"))
            .bearer_auth(&token)
            .send()
            .await?;

        let status = if response.status() == StatusCode::UNAUTHORIZED {
            warn!("carrier token revoked; re-authenticating");
            self.invalidate_token().await;
            let token = self.ensure_token().await?;
            self.http
                .get(self.url("/users/me"))
                .bearer_auth(&token)
                .send()
                .await?
                .status()
        } else {
            response.status()
        };

        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(CarrierError::Auth {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    /// Send an authenticated request. On a 401 the cached token is dropped,
    /// a fresh login happens, and the request is retried exactly once.
    pub(crate) async fn send_authed(
        &self,
        request: reqwest::RequestBuilder,
        endpoint: &'static str,
    ) -> Result<reqwest::Response, CarrierError> {
        let token = self.ensure_token().await?;
        let retry = request.try_clone();

        let response = request.bearer_auth(&token).send().await;
        let response = match (response, retry) {
            (Ok(resp), Some(retry)) if resp.status() == StatusCode::UNAUTHORIZED => {
                warn!(endpoint, "carrier rejected token; re-authenticating once");
                self.invalidate_token().await;
                let token = self.ensure_token().await?;
                retry.bearer_auth(&token).send().await
            }
            (other, _) => other,
        };

        match response {
            Ok(resp) => {
                let outcome = if resp.status().is_success() { "ok" } else { "error" };
                self.metrics
                    .carrier_requests_total
                    .with_label_values(&[endpoint, outcome])
                    .inc();
                Ok(resp)
            }
            Err(err) => {
                self.metrics
                    .carrier_requests_total
                    .with_label_values(&[endpoint, "transport_error"])
                    .inc();
                Err(err.into())
            }
        }
    }
}
