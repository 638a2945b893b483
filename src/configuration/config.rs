use serde::Deserialize;
use std::fs;

// --------------------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    // --- connectivity ---

    /// SunPower Maxeon cloud API base URL.
    pub api_base_url: String,
    /// OAuth2 access token for the cloud API. Obtaining and refreshing the
    /// token happens outside this process (scopes: offline_access
    /// system.read system.write); paste the current token here.
    pub access_token: String,
    /// Per-request HTTP timeout (s). The vendor API occasionally stalls;
    /// never run without a timeout.
    pub http_timeout_seconds: u64,

    // --- refresh cadences ---

    /// Realtime tier: instantaneous power readings.
    pub realtime_interval_seconds: u64,
    /// Periodic tier: energy counters, UPS state, schedules, export limit.
    pub periodic_interval_seconds: u64,
    /// Full tier: system list and nameplate details. These barely change,
    /// one refresh per hour is plenty.
    pub full_interval_seconds: u64,

    // --- behaviour ---

    /// Desired backup-UPS state to enforce once at startup.
    /// Leave null to keep whatever the system is currently set to.
    pub battery_ups_enable: Option<bool>,
    /// How often the summary line is written to the log (s).
    pub display_interval_seconds: u64,

    // --- logging ---

    /// Log level: "Trace", "Debug", "Info", "Warn", "Error"
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // connectivity
            api_base_url:         "https://api.sunpower.maxeon.com".to_string(),
            access_token:         String::new(),
            http_timeout_seconds: 10,
            // cadences - power moves every few seconds, counters every few
            // minutes, nameplate data almost never
            realtime_interval_seconds: 10,
            periodic_interval_seconds: 600,
            full_interval_seconds:     3600,
            // behaviour
            battery_ups_enable:       None,
            display_interval_seconds: 30,
            // logging
            log_level: "Info".to_string(),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------

pub fn load_config() -> Config {
    let config_file = "config.json";
    let config_data = fs::read_to_string(config_file)
        .expect("Failed to read configuration file");
    serde_json::from_str(&config_data)
        .expect("Failed to parse configuration file")
}

// --------------------------------------------------------------------------------------------------------------
