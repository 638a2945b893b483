use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::schedule_models::{ChargingSchedule, DischargingSchedule};
use crate::models::system_models::{
    BatteryUps, EnergyReading, ExportLimit, PowerReading, SystemDetails,
};

// --------------------------------------------------------------------------------------------------------------

/// Latest known value per vendor resource. Every slot starts empty and is
/// only ever replaced wholesale, so a reader sees either nothing or one
/// complete generation of a value, never a mix of two fetches.
///
/// Key ownership (single writer per slot):
///   full tier      -> system_sn, details
///   periodic tier  -> energy, battery_ups, charging_schedule,
///                     discharging_schedule, export_limit
///   realtime tier  -> power
#[derive(Debug, Clone, Default)]
pub struct ResourceState {
    pub system_sn:            Option<String>,
    pub details:              Option<SystemDetails>,
    pub power:                Option<PowerReading>,
    pub energy:               Option<EnergyReading>,
    pub battery_ups:          Option<BatteryUps>,
    pub charging_schedule:    Option<ChargingSchedule>,
    pub discharging_schedule: Option<DischargingSchedule>,
    pub export_limit:         Option<ExportLimit>,
}

/// Cheaply clonable handle to the shared state, passed to every coordinator
/// and entity at construction.
#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<Mutex<ResourceState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone out the whole current state. The lock is only held for the
    /// clone, never across an await.
    pub fn snapshot(&self) -> ResourceState {
        self.inner.lock().clone()
    }

    pub fn system_sn(&self) -> Option<String> {
        self.inner.lock().system_sn.clone()
    }

    pub fn battery_ups(&self) -> Option<BatteryUps> {
        self.inner.lock().battery_ups
    }

    // ----------------------------------------------------------------------------------------------------------
    // Writers. One setter per slot keeps the replace-whole-value discipline
    // visible at the call site; there is no way to mutate a stored value in
    // place.

    pub fn set_identity(&self, system_sn: String, details: SystemDetails) {
        let mut state = self.inner.lock();
        state.system_sn = Some(system_sn);
        state.details = Some(details);
    }

    pub fn set_power(&self, power: PowerReading) {
        self.inner.lock().power = Some(power);
    }

    pub fn set_energy(&self, energy: EnergyReading) {
        self.inner.lock().energy = Some(energy);
    }

    pub fn set_battery_ups(&self, ups: BatteryUps) {
        self.inner.lock().battery_ups = Some(ups);
    }

    pub fn set_charging_schedule(&self, schedule: ChargingSchedule) {
        self.inner.lock().charging_schedule = Some(schedule);
    }

    pub fn set_discharging_schedule(&self, schedule: DischargingSchedule) {
        self.inner.lock().discharging_schedule = Some(schedule);
    }

    pub fn set_export_limit(&self, limit: ExportLimit) {
        self.inner.lock().export_limit = Some(limit);
    }
}

// --------------------------------------------------------------------------------------------------------------
