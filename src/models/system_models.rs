use serde::{Deserialize, Serialize};

// --------------------------------------------------------------------------------------------------------------
// SunPower Maxeon cloud API payloads.
//
// Read:  GET /v1/systems                         -> {"systems": [{...}, ...]}
//        GET /v1/systems/{sn}                    -> nameplate details
//        GET /v1/systems/{sn}/power_meter        -> instantaneous power
//        GET /v1/systems/{sn}/energy_meter       -> cumulative counters
//        GET /v1/systems/{sn}/battery_ups        -> {"enable": bool}
//        GET /v1/systems/{sn}/export_limit       -> {"limit_percent": 0-100}
//
// Every read endpoint may answer 404 when the account has no real hardware
// behind it yet; each payload therefore carries a demo() constant that the
// client substitutes so the readout stays populated.
// --------------------------------------------------------------------------------------------------------------

/// Response of GET /v1/systems.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SystemList {
    #[serde(default)]
    pub systems: Vec<SystemSummary>,
}

/// One entry in the system list. The serial number is the only identity
/// the API has; everything else is decoration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SystemSummary {
    pub system_sn: String,
    #[serde(default)]
    pub system_name: String,
    #[serde(default)]
    pub status: String,
}

/// Nameplate details from GET /v1/systems/{sn}.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SystemDetails {
    pub system_sn: String,
    #[serde(default)]
    pub system_name:   String,
    #[serde(default)]
    pub status:        String,
    #[serde(default)]
    pub inverter_model: String,
    #[serde(default)]
    pub inv_version:   String,
    #[serde(default)]
    pub battery_model: String,
    #[serde(default)]
    pub battery_capacity_wh: f64,
    #[serde(default)]
    pub rated_power_w: f64,
}

/// Instantaneous readings from GET /v1/systems/{sn}/power_meter.
/// Sign conventions follow the vendor: battery positive = charging,
/// grid positive = import.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PowerReading {
    #[serde(default)]
    pub pv_power_w:      f64,
    #[serde(default)]
    pub battery_power_w: f64,
    #[serde(default)]
    pub grid_power_w:    f64,
    #[serde(default)]
    pub load_power_w:    f64,
    #[serde(default)]
    pub soc_percent:     f64,
}

/// Lifetime counters from GET /v1/systems/{sn}/energy_meter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EnergyReading {
    #[serde(default)]
    pub pv_energy_wh:                f64,
    #[serde(default)]
    pub battery_charge_energy_wh:    f64,
    #[serde(default)]
    pub battery_discharge_energy_wh: f64,
    #[serde(default)]
    pub grid_import_energy_wh:       f64,
    #[serde(default)]
    pub grid_export_energy_wh:       f64,
    #[serde(default)]
    pub load_energy_wh:              f64,
}

/// Backup-UPS mode, GET/PUT /v1/systems/{sn}/battery_ups.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatteryUps {
    pub enable: bool,
}

/// Grid export cap, GET/PUT /v1/systems/{sn}/export_limit.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportLimit {
    pub limit_percent: u8,
}

// --------------------------------------------------------------------------------------------------------------
// Demo fallbacks, substituted on HTTP 404.

impl SystemList {
    pub fn demo() -> Self {
        Self {
            systems: vec![SystemSummary {
                system_sn:   "DEMO-000001".to_string(),
                system_name: "Demo System".to_string(),
                status:      "demo".to_string(),
            }],
        }
    }
}

impl SystemDetails {
    pub fn demo() -> Self {
        Self {
            system_sn:      "DEMO-000001".to_string(),
            system_name:    "Demo System".to_string(),
            status:         "demo".to_string(),
            inverter_model: "SPWR-M-8000".to_string(),
            inv_version:    "0.0.0".to_string(),
            battery_model:  "SunVault 13".to_string(),
            battery_capacity_wh: 13_000.0,
            rated_power_w:  8_000.0,
        }
    }
}

impl PowerReading {
    pub fn demo() -> Self {
        Self { soc_percent: 50.0, ..Self::default() }
    }
}

impl EnergyReading {
    pub fn demo() -> Self {
        Self::default()
    }
}

impl BatteryUps {
    pub fn demo() -> Self {
        Self { enable: false }
    }
}

impl ExportLimit {
    pub fn demo() -> Self {
        Self { limit_percent: 100 }
    }
}

// --------------------------------------------------------------------------------------------------------------
