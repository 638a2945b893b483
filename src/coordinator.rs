use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::MissedTickBehavior;

use crate::handlers::maxeon::client::MaxeonClient;
use crate::handlers::maxeon::errors::{MaxeonError, MaxeonResult};
use crate::state::StateStore;

// --------------------------------------------------------------------------------------------------------------

/// Which slice of the vendor API a coordinator owns. Splitting by cadence
/// keeps the realtime loop cheap: one GET per tick instead of eight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// System list + nameplate details. Also discovers the serial number
    /// everything else keys on.
    Full,
    /// Energy counters, UPS state, schedules, export limit.
    Periodic,
    /// Instantaneous power only.
    Realtime,
}

impl Tier {
    pub fn name(self) -> &'static str {
        match self {
            Tier::Full => "full",
            Tier::Periodic => "periodic",
            Tier::Realtime => "realtime",
        }
    }
}

// --------------------------------------------------------------------------------------------------------------

/// One scheduled polling loop. Each tick runs its fetches as sequential
/// awaits, then commits everything it fetched to the shared store in one
/// go. A tick that fails anywhere commits nothing: entities keep showing
/// the last known values and only `last_update_success` drops.
pub struct Coordinator {
    tier:     Tier,
    interval: Duration,
    client:   Arc<MaxeonClient>,
    store:    StateStore,
    last_update_success: AtomicBool,
}

impl Coordinator {
    pub fn new(tier: Tier, interval: Duration, client: Arc<MaxeonClient>, store: StateStore) -> Self {
        Self {
            tier,
            interval,
            client,
            store,
            last_update_success: AtomicBool::new(false),
        }
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::Relaxed)
    }

    // ----------------------------------------------------------------------------------------------------------

    /// Setup-time refresh. Unlike the steady-state path this propagates the
    /// error so the caller can refuse to start: a monitor that never learned
    /// its serial number has nothing to poll.
    pub async fn first_refresh(&self) -> MaxeonResult<()> {
        let result = self.refresh_inner().await;
        self.last_update_success.store(result.is_ok(), Ordering::Relaxed);
        result
    }

    /// Steady-state refresh: failures are logged and flagged, never raised.
    /// Also the forced-refresh entry point for the write path.
    pub async fn refresh(&self) {
        match self.refresh_inner().await {
            Ok(()) => {
                debug!("[Coordinator] {} tick ok", self.tier.name());
                self.last_update_success.store(true, Ordering::Relaxed);
            }
            Err(e) => {
                warn!("[Coordinator] {} tick failed, keeping last data: {}", self.tier.name(), e);
                self.last_update_success.store(false, Ordering::Relaxed);
            }
        }
    }

    async fn refresh_inner(&self) -> MaxeonResult<()> {
        match self.tier {
            Tier::Full => {
                let list = self.client.systems().await?;
                let system_sn = list
                    .systems
                    .first()
                    .map(|s| s.system_sn.clone())
                    .filter(|sn| !sn.is_empty())
                    .ok_or(MaxeonError::NoSystems)?;
                let details = self.client.system_details(&system_sn).await?;
                self.store.set_identity(system_sn, details);
            }
            Tier::Periodic => {
                let system_sn = self.store.system_sn().ok_or(MaxeonError::NoSystems)?;
                // Fetch everything first, commit after: a failure halfway
                // through must not leave the store half-updated.
                let energy = self.client.energy_meter(&system_sn).await?;
                let ups = self.client.battery_ups(&system_sn).await?;
                let charging = self.client.charging_schedule(&system_sn).await?;
                let discharging = self.client.discharging_schedule(&system_sn).await?;
                let export = self.client.export_limit(&system_sn).await?;
                self.store.set_energy(energy);
                self.store.set_battery_ups(ups);
                self.store.set_charging_schedule(charging);
                self.store.set_discharging_schedule(discharging);
                self.store.set_export_limit(export);
            }
            Tier::Realtime => {
                let system_sn = self.store.system_sn().ok_or(MaxeonError::NoSystems)?;
                let power = self.client.power_meter(&system_sn).await?;
                self.store.set_power(power);
            }
        }
        Ok(())
    }

    // ----------------------------------------------------------------------------------------------------------

    /// Scheduled loop, one task per tier. Setup already ran the first
    /// refresh synchronously, so the immediate tick a fresh interval fires
    /// is swallowed; the first scheduled fetch lands one interval later.
    pub async fn run(self: Arc<Self>) {
        info!("[Coordinator] {} tier polling every {:?}", self.tier.name(), self.interval);
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.refresh().await;
        }
    }
}

// --------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::maxeon::auth::StaticTokenProvider;
    use crate::models::system_models::{BatteryUps, EnergyReading, PowerReading};
    use mockito::{Server, ServerGuard};
    use serde_json::json;

    fn client_for(server: &ServerGuard) -> Arc<MaxeonClient> {
        Arc::new(
            MaxeonClient::new(
                server.url(),
                Arc::new(StaticTokenProvider::new("test-token")),
                Duration::from_secs(5),
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn first_refresh_with_zero_systems_fails_and_writes_nothing() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1/systems")
            .with_status(200)
            .with_body(json!({"systems": []}).to_string())
            .create_async()
            .await;

        let store = StateStore::new();
        let coordinator =
            Coordinator::new(Tier::Full, Duration::from_secs(3600), client_for(&server), store.clone());

        let result = coordinator.first_refresh().await;
        assert!(matches!(result, Err(MaxeonError::NoSystems)));
        assert!(!coordinator.last_update_success());
        assert!(store.snapshot().system_sn.is_none());
        assert!(store.snapshot().details.is_none());
    }

    #[tokio::test]
    async fn full_refresh_discovers_serial_and_details() {
        let mut server = Server::new_async().await;
        let _systems = server
            .mock("GET", "/v1/systems")
            .with_status(200)
            .with_body(json!({"systems": [{"system_sn": "SN42", "status": "online"}]}).to_string())
            .create_async()
            .await;
        let _details = server
            .mock("GET", "/v1/systems/SN42")
            .with_status(200)
            .with_body(
                json!({"system_sn": "SN42", "status": "online", "inverter_model": "SPWR-M-8000"})
                    .to_string(),
            )
            .create_async()
            .await;

        let store = StateStore::new();
        let coordinator =
            Coordinator::new(Tier::Full, Duration::from_secs(3600), client_for(&server), store.clone());

        coordinator.first_refresh().await.unwrap();
        assert!(coordinator.last_update_success());
        assert_eq!(store.system_sn().as_deref(), Some("SN42"));
        assert_eq!(store.snapshot().details.unwrap().inverter_model, "SPWR-M-8000");
    }

    #[tokio::test]
    async fn failed_tick_retains_previous_data() {
        let mut server = Server::new_async().await;
        // Energy succeeds with a new value, then the UPS fetch blows up.
        let _energy = server
            .mock("GET", "/v1/systems/SN42/energy_meter")
            .with_status(200)
            .with_body(json!({"pv_energy_wh": 999999.0}).to_string())
            .create_async()
            .await;
        let _ups = server
            .mock("GET", "/v1/systems/SN42/battery_ups")
            .with_status(500)
            .create_async()
            .await;

        let store = StateStore::new();
        store.set_identity("SN42".to_string(), crate::models::system_models::SystemDetails::demo());
        store.set_energy(EnergyReading { pv_energy_wh: 1234.0, ..Default::default() });
        store.set_battery_ups(BatteryUps { enable: true });
        let before = store.snapshot();

        let coordinator = Coordinator::new(
            Tier::Periodic,
            Duration::from_secs(600),
            client_for(&server),
            store.clone(),
        );
        coordinator.refresh().await;

        assert!(!coordinator.last_update_success());
        let after = store.snapshot();
        // Nothing moved - not even the energy value that fetched fine.
        assert_eq!(after.energy.unwrap().pv_energy_wh, before.energy.unwrap().pv_energy_wh);
        assert_eq!(after.battery_ups, before.battery_ups);
    }

    #[tokio::test]
    async fn periodic_tick_fills_its_slots_via_fallbacks() {
        let mut server = Server::new_async().await;
        let _ups = server
            .mock("GET", "/v1/systems/SN42/battery_ups")
            .with_status(200)
            .with_body(json!({"enable": true}).to_string())
            .create_async()
            .await;
        // Everything else is unprovisioned on this account.
        for path in [
            "/v1/systems/SN42/energy_meter",
            "/v1/systems/SN42/charging_schedule",
            "/v1/systems/SN42/discharging_schedule",
            "/v1/systems/SN42/export_limit",
        ] {
            let _ = server.mock("GET", path).with_status(404).create_async().await;
        }

        let store = StateStore::new();
        store.set_identity("SN42".to_string(), crate::models::system_models::SystemDetails::demo());

        let coordinator = Coordinator::new(
            Tier::Periodic,
            Duration::from_secs(600),
            client_for(&server),
            store.clone(),
        );
        coordinator.refresh().await;

        assert!(coordinator.last_update_success());
        let state = store.snapshot();
        assert!(state.battery_ups.unwrap().enable);
        assert_eq!(state.energy.unwrap(), EnergyReading::demo());
        assert_eq!(state.export_limit.unwrap().limit_percent, 100);
        // Power belongs to the realtime tier; this tick must not touch it.
        assert!(state.power.is_none());
    }

    #[tokio::test]
    async fn realtime_tick_writes_only_power() {
        let mut server = Server::new_async().await;
        let _power = server
            .mock("GET", "/v1/systems/SN42/power_meter")
            .with_status(200)
            .with_body(json!({"pv_power_w": 3100.0, "soc_percent": 76.0}).to_string())
            .create_async()
            .await;

        let store = StateStore::new();
        store.set_identity("SN42".to_string(), crate::models::system_models::SystemDetails::demo());

        let coordinator = Coordinator::new(
            Tier::Realtime,
            Duration::from_secs(10),
            client_for(&server),
            store.clone(),
        );
        coordinator.refresh().await;

        assert!(coordinator.last_update_success());
        let state = store.snapshot();
        assert_eq!(state.power.unwrap(), PowerReading { pv_power_w: 3100.0, soc_percent: 76.0, ..Default::default() });
        assert!(state.energy.is_none());
    }

    #[tokio::test]
    async fn tick_before_discovery_marks_failure() {
        let server = Server::new_async().await;
        let store = StateStore::new();
        let coordinator = Coordinator::new(
            Tier::Realtime,
            Duration::from_secs(10),
            client_for(&server),
            store,
        );
        coordinator.refresh().await;
        assert!(!coordinator.last_update_success());
    }
}
