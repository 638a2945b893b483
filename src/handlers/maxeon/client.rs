use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::auth::AccessTokenProvider;
use super::errors::{MaxeonError, MaxeonResult};
use crate::models::schedule_models::{ChargingSchedule, DischargingSchedule};
use crate::models::system_models::{
    BatteryUps, EnergyReading, ExportLimit, PowerReading, SystemDetails, SystemList,
};

// --------------------------------------------------------------------------------------------------------------

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

// --------------------------------------------------------------------------------------------------------------

/// Authenticated client for the SunPower Maxeon cloud API.
///
/// One method per vendor resource, all funnelled through two helpers:
/// `get_or_fallback` for reads and `put_json` for writes. Error policy is
/// uniform across every endpoint: a GET answering 404 yields that
/// resource's demo payload, any other failure propagates as `MaxeonError`.
pub struct MaxeonClient {
    http:        Client,
    base_url:    String,
    tokens:      Arc<dyn AccessTokenProvider>,
    max_retries: u32,
    retry_delay: Duration,
}

impl MaxeonClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<dyn AccessTokenProvider>,
        timeout: Duration,
    ) -> MaxeonResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            tokens,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        })
    }

    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    // ----------------------------------------------------------------------------------------------------------

    /// Issue one request with a fresh bearer token, retrying transport-level
    /// failures with doubling delay. HTTP error statuses are returned to the
    /// caller untouched; retrying a 500 would only hammer the vendor.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> MaxeonResult<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.tokens.access_token()?;

        let mut attempts = 0;
        let mut delay = self.retry_delay;
        loop {
            attempts += 1;
            let mut request = self.http.request(method.clone(), &url).bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    error!("[Maxeon] {} {} failed after {} attempts: {}", method, path, attempts, e);
                    return Err(MaxeonError::Http(e));
                }
                Err(e) => {
                    warn!(
                        "[Maxeon] {} {} failed (attempt {}/{}): {}. Retrying in {:?}.",
                        method, path, attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    /// GET a resource. 2xx parses into `T`, 404 degrades to the supplied
    /// demo payload so an unprovisioned account still shows a populated
    /// readout, anything else is an error.
    async fn get_or_fallback<T: DeserializeOwned>(&self, path: &str, fallback: T) -> MaxeonResult<T> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        match response.status() {
            status if status.is_success() => {
                debug!("[Maxeon] GET {} -> {}", path, status);
                Ok(response.json::<T>().await?)
            }
            StatusCode::NOT_FOUND => {
                warn!("[Maxeon] GET {} -> 404, serving demo payload", path);
                Ok(fallback)
            }
            status => {
                let message = response.text().await.unwrap_or_default();
                error!("[Maxeon] GET {} -> {}: {}", path, status, message);
                Err(MaxeonError::Api { status: status.as_u16(), message })
            }
        }
    }

    /// PUT a new resource value and parse the confirmed value the API
    /// echoes back. Writes never degrade to demo data.
    async fn put_json<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> MaxeonResult<T> {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        let status = response.status();
        if status.is_success() {
            info!("[Maxeon] PUT {} accepted", path);
            Ok(response.json::<T>().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            error!("[Maxeon] PUT {} -> {}: {}", path, status, message);
            Err(MaxeonError::Api { status: status.as_u16(), message })
        }
    }

    // ----------------------------------------------------------------------------------------------------------
    // Reads

    /// List the systems on the account.
    pub async fn systems(&self) -> MaxeonResult<SystemList> {
        self.get_or_fallback("/v1/systems", SystemList::demo()).await
    }

    /// Nameplate details for one system.
    pub async fn system_details(&self, system_sn: &str) -> MaxeonResult<SystemDetails> {
        let path = format!("/v1/systems/{}", system_sn);
        self.get_or_fallback(&path, SystemDetails::demo()).await
    }

    /// Instantaneous power readings.
    pub async fn power_meter(&self, system_sn: &str) -> MaxeonResult<PowerReading> {
        let path = format!("/v1/systems/{}/power_meter", system_sn);
        self.get_or_fallback(&path, PowerReading::demo()).await
    }

    /// Cumulative energy counters.
    pub async fn energy_meter(&self, system_sn: &str) -> MaxeonResult<EnergyReading> {
        let path = format!("/v1/systems/{}/energy_meter", system_sn);
        self.get_or_fallback(&path, EnergyReading::demo()).await
    }

    pub async fn battery_ups(&self, system_sn: &str) -> MaxeonResult<BatteryUps> {
        let path = format!("/v1/systems/{}/battery_ups", system_sn);
        self.get_or_fallback(&path, BatteryUps::demo()).await
    }

    pub async fn charging_schedule(&self, system_sn: &str) -> MaxeonResult<ChargingSchedule> {
        let path = format!("/v1/systems/{}/charging_schedule", system_sn);
        self.get_or_fallback(&path, ChargingSchedule::demo()).await
    }

    pub async fn discharging_schedule(&self, system_sn: &str) -> MaxeonResult<DischargingSchedule> {
        let path = format!("/v1/systems/{}/discharging_schedule", system_sn);
        self.get_or_fallback(&path, DischargingSchedule::demo()).await
    }

    pub async fn export_limit(&self, system_sn: &str) -> MaxeonResult<ExportLimit> {
        let path = format!("/v1/systems/{}/export_limit", system_sn);
        self.get_or_fallback(&path, ExportLimit::demo()).await
    }

    // ----------------------------------------------------------------------------------------------------------
    // Writes

    pub async fn set_battery_ups(&self, system_sn: &str, enable: bool) -> MaxeonResult<BatteryUps> {
        let path = format!("/v1/systems/{}/battery_ups", system_sn);
        self.put_json(&path, &BatteryUps { enable }).await
    }

    pub async fn set_charging_schedule(
        &self,
        system_sn: &str,
        schedule: &ChargingSchedule,
    ) -> MaxeonResult<ChargingSchedule> {
        schedule.validate().map_err(MaxeonError::InvalidRequest)?;
        let path = format!("/v1/systems/{}/charging_schedule", system_sn);
        self.put_json(&path, schedule).await
    }

    pub async fn set_discharging_schedule(
        &self,
        system_sn: &str,
        schedule: &DischargingSchedule,
    ) -> MaxeonResult<DischargingSchedule> {
        schedule.validate().map_err(MaxeonError::InvalidRequest)?;
        let path = format!("/v1/systems/{}/discharging_schedule", system_sn);
        self.put_json(&path, schedule).await
    }

    pub async fn set_export_limit(&self, system_sn: &str, limit_percent: u8) -> MaxeonResult<ExportLimit> {
        if limit_percent > 100 {
            return Err(MaxeonError::InvalidRequest(format!(
                "export limit must be within 0-100, got {}",
                limit_percent
            )));
        }
        let path = format!("/v1/systems/{}/export_limit", system_sn);
        self.put_json(&path, &ExportLimit { limit_percent }).await
    }
}

// --------------------------------------------------------------------------------------------------------------
