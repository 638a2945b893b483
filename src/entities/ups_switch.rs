use std::sync::Arc;

use log::{error, info};
use parking_lot::Mutex;

use crate::coordinator::Coordinator;
use crate::handlers::maxeon::client::MaxeonClient;
use crate::handlers::maxeon::errors::MaxeonResult;
use crate::state::StateStore;

// --------------------------------------------------------------------------------------------------------------

/// The backup-UPS toggle, the one write path in the whole monitor.
///
/// A toggle PUTs the new state, shows it optimistically while the periodic
/// tier re-fetches, then drops the override so reads follow server truth
/// again. The override is cleared on every exit path, and only after the
/// forced refresh has completed: clearing it earlier would let a stale
/// stored value flicker through between write and refresh.
pub struct UpsSwitch {
    client:      Arc<MaxeonClient>,
    store:       StateStore,
    coordinator: Arc<Coordinator>,
    system_sn:   String,
    optimistic:  Mutex<Option<bool>>,
}

impl UpsSwitch {
    /// `coordinator` must be the periodic tier: it owns the battery_ups
    /// slot this switch reads and reconciles against.
    pub fn new(
        client: Arc<MaxeonClient>,
        store: StateStore,
        coordinator: Arc<Coordinator>,
        system_sn: String,
    ) -> Self {
        Self {
            client,
            store,
            coordinator,
            system_sn,
            optimistic: Mutex::new(None),
        }
    }

    /// Current switch position: the in-flight optimistic value if a toggle
    /// is pending, otherwise the last fetched state, otherwise off.
    pub fn is_on(&self) -> bool {
        if let Some(pending) = *self.optimistic.lock() {
            return pending;
        }
        self.store.battery_ups().map(|ups| ups.enable).unwrap_or(false)
    }

    pub async fn turn_on(&self) -> MaxeonResult<()> {
        self.set_state(true).await
    }

    pub async fn turn_off(&self) -> MaxeonResult<()> {
        self.set_state(false).await
    }

    async fn set_state(&self, enable: bool) -> MaxeonResult<()> {
        let result = self.client.set_battery_ups(&self.system_sn, enable).await;
        match &result {
            Ok(confirmed) => {
                info!("[UpsSwitch] UPS enable set to {}", confirmed.enable);
                *self.optimistic.lock() = Some(confirmed.enable);
            }
            Err(e) => error!("[UpsSwitch] Failed to set UPS state: {}", e),
        }

        // Both arms fall through here: reconcile with the server, then drop
        // the override. A failed write must not keep lying about the state.
        self.coordinator.refresh().await;
        *self.optimistic.lock() = None;

        result.map(|_| ())
    }
}

// --------------------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Tier;
    use crate::handlers::maxeon::auth::StaticTokenProvider;
    use crate::models::system_models::{BatteryUps, SystemDetails};
    use mockito::{Server, ServerGuard};
    use serde_json::json;
    use std::time::Duration;

    fn client_for(url: &str) -> Arc<MaxeonClient> {
        Arc::new(
            MaxeonClient::new(
                url,
                Arc::new(StaticTokenProvider::new("test-token")),
                Duration::from_secs(5),
            )
            .unwrap(),
        )
    }

    fn switch_for(server_url: &str, store: StateStore) -> UpsSwitch {
        let client = client_for(server_url);
        let coordinator = Arc::new(Coordinator::new(
            Tier::Periodic,
            Duration::from_secs(600),
            client.clone(),
            store.clone(),
        ));
        UpsSwitch::new(client, store, coordinator, "SN42".to_string())
    }

    /// Mock the periodic tier's refresh: UPS answers with `enable`,
    /// everything else is unprovisioned.
    async fn mock_periodic_refresh(server: &mut ServerGuard, enable: bool) {
        let _ = server
            .mock("GET", "/v1/systems/SN42/battery_ups")
            .with_status(200)
            .with_body(json!({"enable": enable}).to_string())
            .create_async()
            .await;
        for path in [
            "/v1/systems/SN42/energy_meter",
            "/v1/systems/SN42/charging_schedule",
            "/v1/systems/SN42/discharging_schedule",
            "/v1/systems/SN42/export_limit",
        ] {
            let _ = server.mock("GET", path).with_status(404).create_async().await;
        }
    }

    #[test]
    fn optimistic_override_wins_reads() {
        let store = StateStore::new();
        store.set_battery_ups(BatteryUps { enable: false });
        let switch = switch_for("http://127.0.0.1:9", store);

        assert!(!switch.is_on());
        *switch.optimistic.lock() = Some(true);
        assert!(switch.is_on());
        *switch.optimistic.lock() = None;
        assert!(!switch.is_on());
    }

    #[test]
    fn empty_store_reads_off() {
        let switch = switch_for("http://127.0.0.1:9", StateStore::new());
        assert!(!switch.is_on());
    }

    #[tokio::test]
    async fn successful_toggle_reconciles_with_server() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/v1/systems/SN42/battery_ups")
            .match_body(mockito::Matcher::Json(json!({"enable": true})))
            .with_status(200)
            .with_body(json!({"enable": true}).to_string())
            .create_async()
            .await;
        mock_periodic_refresh(&mut server, true).await;

        let store = StateStore::new();
        store.set_identity("SN42".to_string(), SystemDetails::demo());
        store.set_battery_ups(BatteryUps { enable: false });
        let switch = switch_for(&server.url(), store.clone());

        switch.turn_on().await.unwrap();

        put.assert_async().await;
        // Override dropped after reconciliation; the store now carries the
        // server-confirmed value.
        assert!(switch.optimistic.lock().is_none());
        assert!(store.battery_ups().unwrap().enable);
        assert!(switch.is_on());
    }

    #[tokio::test]
    async fn failed_write_leaves_no_stale_override() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", "/v1/systems/SN42/battery_ups")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;
        // The forced refresh still runs and still reports server truth.
        mock_periodic_refresh(&mut server, false).await;

        let store = StateStore::new();
        store.set_identity("SN42".to_string(), SystemDetails::demo());
        store.set_battery_ups(BatteryUps { enable: false });
        let switch = switch_for(&server.url(), store.clone());

        let result = switch.turn_on().await;
        assert!(result.is_err());

        put.assert_async().await;
        assert!(switch.optimistic.lock().is_none());
        assert!(!switch.is_on());
    }
}
