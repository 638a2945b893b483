use std::sync::Arc;

use crate::coordinator::Coordinator;
use crate::models::schedule_models::{ChargingSchedule, DischargingSchedule};
use crate::models::system_models::{EnergyReading, PowerReading};
use crate::state::StateStore;

// --------------------------------------------------------------------------------------------------------------
// Read-only views over the shared store, one per display concern. Each
// sensor pairs the store with the coordinator that owns its slots, so
// availability reflects whether that tier has ever fetched successfully.
// Readers always default when a slot is empty; they never assume a fetch
// has happened.
// --------------------------------------------------------------------------------------------------------------

/// Device metadata in the shape host automation platforms expect.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub name:         String,
    pub manufacturer: String,
    pub model:        String,
    pub sw_version:   String,
    pub serial:       String,
}

// --------------------------------------------------------------------------------------------------------------

/// System status and nameplate metadata (full tier).
pub struct SystemInfoSensor {
    store:       StateStore,
    coordinator: Arc<Coordinator>,
}

impl SystemInfoSensor {
    pub fn new(store: StateStore, coordinator: Arc<Coordinator>) -> Self {
        Self { store, coordinator }
    }

    /// The system status string, "unknown" until the first successful fetch.
    pub fn state(&self) -> String {
        self.store
            .snapshot()
            .details
            .map(|d| d.status)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    pub fn device_info(&self) -> DeviceInfo {
        let details = self.store.snapshot().details;
        match details {
            Some(d) => DeviceInfo {
                name:         "SunPower Maxeon System".to_string(),
                manufacturer: "SunPower".to_string(),
                model:        if d.inverter_model.is_empty() { "Unknown".to_string() } else { d.inverter_model },
                sw_version:   d.inv_version,
                serial:       d.system_sn,
            },
            None => DeviceInfo {
                name:         "SunPower Maxeon System".to_string(),
                manufacturer: "SunPower".to_string(),
                model:        "Unknown".to_string(),
                sw_version:   String::new(),
                serial:       "unknown".to_string(),
            },
        }
    }
}

// --------------------------------------------------------------------------------------------------------------

/// Instantaneous power flows and state of charge (realtime tier).
pub struct PowerFlowSensor {
    store:       StateStore,
    coordinator: Arc<Coordinator>,
}

impl PowerFlowSensor {
    pub fn new(store: StateStore, coordinator: Arc<Coordinator>) -> Self {
        Self { store, coordinator }
    }

    pub fn reading(&self) -> Option<PowerReading> {
        self.store.snapshot().power
    }

    pub fn soc_percent(&self) -> Option<f64> {
        self.reading().map(|p| p.soc_percent)
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }
}

// --------------------------------------------------------------------------------------------------------------

/// Cumulative energy counters (periodic tier).
pub struct EnergySensor {
    store:       StateStore,
    coordinator: Arc<Coordinator>,
}

impl EnergySensor {
    pub fn new(store: StateStore, coordinator: Arc<Coordinator>) -> Self {
        Self { store, coordinator }
    }

    pub fn totals(&self) -> Option<EnergyReading> {
        self.store.snapshot().energy
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }
}

// --------------------------------------------------------------------------------------------------------------

/// Configuration readouts: schedules and export limit (periodic tier).
pub struct SettingsSensor {
    store:       StateStore,
    coordinator: Arc<Coordinator>,
}

impl SettingsSensor {
    pub fn new(store: StateStore, coordinator: Arc<Coordinator>) -> Self {
        Self { store, coordinator }
    }

    pub fn charging_schedule(&self) -> Option<ChargingSchedule> {
        self.store.snapshot().charging_schedule
    }

    pub fn discharging_schedule(&self) -> Option<DischargingSchedule> {
        self.store.snapshot().discharging_schedule
    }

    pub fn export_limit_percent(&self) -> Option<u8> {
        self.store.snapshot().export_limit.map(|l| l.limit_percent)
    }

    pub fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }
}

// --------------------------------------------------------------------------------------------------------------
