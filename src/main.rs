use std::sync::Arc;

use log::LevelFilter;
use tokio::time::{sleep, Duration};

// --------------------------------------------------------------------------------------------------------------

mod configuration;
use configuration::config::load_config;

mod models;
mod state;

mod handlers;
use handlers::maxeon::auth::StaticTokenProvider;
use handlers::maxeon::client::MaxeonClient;

mod coordinator;
use coordinator::{Coordinator, Tier};

mod entities;
use entities::sensors::{EnergySensor, PowerFlowSensor, SettingsSensor, SystemInfoSensor};
use entities::ups_switch::UpsSwitch;

use state::StateStore;

// --------------------------------------------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    let config = load_config();

    // Initialise logger.
    if let Err(e) = env_logger::Builder::new()
        .filter_level(config.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::Info))
        .try_init()
    {
        eprintln!("Failed to initialise logger: {}", e);
        panic!("Cannot start without logging");
    }

    log::info!("=== SunPower Maxeon cloud monitor starting ===");
    log::info!("API base URL: {}", config.api_base_url);
    log::info!(
        "Cadences: realtime {}s, periodic {}s, full {}s",
        config.realtime_interval_seconds,
        config.periodic_interval_seconds,
        config.full_interval_seconds,
    );

    let tokens = Arc::new(StaticTokenProvider::new(config.access_token.clone()));
    let client = match MaxeonClient::new(
        &config.api_base_url,
        tokens,
        Duration::from_secs(config.http_timeout_seconds),
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("[Monitor] Cannot build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let store = StateStore::new();
    let full = Arc::new(Coordinator::new(
        Tier::Full,
        Duration::from_secs(config.full_interval_seconds),
        client.clone(),
        store.clone(),
    ));
    let periodic = Arc::new(Coordinator::new(
        Tier::Periodic,
        Duration::from_secs(config.periodic_interval_seconds),
        client.clone(),
        store.clone(),
    ));
    let realtime = Arc::new(Coordinator::new(
        Tier::Realtime,
        Duration::from_secs(config.realtime_interval_seconds),
        client.clone(),
        store.clone(),
    ));

    // ----------------------------------------------------------------------------------------------------------
    // First refresh runs synchronously, full tier first: without a serial
    // number there is nothing to poll, so that one failing is fatal.
    if let Err(e) = full.first_refresh().await {
        log::error!("[Monitor] Setup failed, no usable system: {}", e);
        std::process::exit(1);
    }
    let system_sn = match store.system_sn() {
        Some(sn) => sn,
        None => {
            log::error!("[Monitor] Setup failed: first refresh stored no serial number");
            std::process::exit(1);
        }
    };
    log::info!("[Monitor] Monitoring system {}", system_sn);

    periodic.refresh().await;
    realtime.refresh().await;

    // ----------------------------------------------------------------------------------------------------------
    // Optionally enforce the configured UPS state once, now that the store
    // carries the current one.
    let ups_switch = UpsSwitch::new(client.clone(), store.clone(), periodic.clone(), system_sn.clone());
    if let Some(desired) = config.battery_ups_enable {
        if ups_switch.is_on() != desired {
            log::info!("[Monitor] Enforcing configured UPS state: {}", desired);
            let result = if desired { ups_switch.turn_on().await } else { ups_switch.turn_off().await };
            if let Err(e) = result {
                log::warn!("[Monitor] Could not enforce UPS state: {}", e);
            }
        }
    }

    // ----------------------------------------------------------------------------------------------------------
    // Steady state: three independent polling loops, one summary loop here.
    tokio::spawn(full.clone().run());
    tokio::spawn(periodic.clone().run());
    tokio::spawn(realtime.clone().run());

    let info = SystemInfoSensor::new(store.clone(), full.clone());
    let power = PowerFlowSensor::new(store.clone(), realtime.clone());
    let energy = EnergySensor::new(store.clone(), periodic.clone());
    let settings = SettingsSensor::new(store.clone(), periodic.clone());

    let display_interval = Duration::from_secs(config.display_interval_seconds);
    loop {
        sleep(display_interval).await;

        let device = info.device_info();
        log::info!(
            "[Monitor] {} sn={} status={} available={}",
            device.model,
            device.serial,
            info.state(),
            info.available(),
        );

        match power.reading() {
            Some(p) => log::info!(
                "[Power] pv={:+.0}W batt={:+.0}W grid={:+.0}W load={:+.0}W SOC={:.1}%",
                p.pv_power_w,
                p.battery_power_w,
                p.grid_power_w,
                p.load_power_w,
                p.soc_percent,
            ),
            None => log::warn!("[Power] No reading yet (available={})", power.available()),
        }

        match energy.totals() {
            Some(e) => log::debug!(
                "[Energy] pv={:.3}kWh chrg={:.3}kWh dischrg={:.3}kWh import={:.3}kWh export={:.3}kWh",
                e.pv_energy_wh / 1000.0,
                e.battery_charge_energy_wh / 1000.0,
                e.battery_discharge_energy_wh / 1000.0,
                e.grid_import_energy_wh / 1000.0,
                e.grid_export_energy_wh / 1000.0,
            ),
            None => log::debug!("[Energy] No totals yet (available={})", energy.available()),
        }

        log::debug!(
            "[Settings] available={} ups={} export_limit={} charging={} discharging={}",
            settings.available(),
            ups_switch.is_on(),
            settings
                .export_limit_percent()
                .map(|p| format!("{}%", p))
                .unwrap_or_else(|| "-".to_string()),
            settings.charging_schedule().map(|s| s.enable).unwrap_or(false),
            settings.discharging_schedule().map(|s| s.enable).unwrap_or(false),
        );
    }
}
