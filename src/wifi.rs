// Smell-It — Soft access point

use anyhow::Result;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::{EspSubscription, EspSystemEventLoop, System};
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{
    AccessPointConfiguration, AuthMethod, BlockingWifi, Configuration, EspWifi, WifiEvent,
};

use crate::config::*;
use crate::credentials::{ApAuth, Credentials};
use crate::events::StationEvent;

/// Running soft AP. Dropping it stops the AP and the station log.
pub struct SoftAp {
    pub wifi: Box<EspWifi<'static>>,
    _stations: EspSubscription<'static, System>,
}

/// Bring up the soft AP and block until its netif is up. Station joins and
/// leaves are logged for as long as the returned [`SoftAp`] lives.
pub fn start_soft_ap(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    creds: &Credentials,
) -> Result<SoftAp> {
    log::info!("Initializing WiFi SoftAP...");

    let stations = sysloop.subscribe::<WifiEvent, _>(|event| {
        let station = match event {
            WifiEvent::ApStaConnected(ev) => StationEvent::Joined {
                mac: ev.mac,
                aid: u16::from(ev.aid),
            },
            WifiEvent::ApStaDisconnected(ev) => StationEvent::Left {
                mac: ev.mac,
                aid: u16::from(ev.aid),
                reason: ev.reason as u16,
            },
            _ => return,
        };
        log::info!("{}", station);
    })?;

    let mut esp_wifi = Box::new(EspWifi::new(modem, sysloop.clone(), Some(nvs))?);

    let auth_method = match creds.auth() {
        ApAuth::Wpa2Personal => AuthMethod::WPA2Personal,
        ApAuth::Open => {
            log::warn!("Password shorter than {} chars — AP is open", WPA2_MIN_PASSWORD_LEN);
            AuthMethod::None
        }
    };

    {
        let mut wifi = BlockingWifi::wrap(esp_wifi.as_mut(), sysloop)?;
        wifi.set_configuration(&Configuration::AccessPoint(AccessPointConfiguration {
            ssid: creds.ssid.clone(),
            password: creds.password.clone(),
            auth_method,
            channel: AP_CHANNEL,
            max_connections: AP_MAX_CONNECTIONS,
            ..Default::default()
        }))?;
        wifi.start()?;
        wifi.wait_netif_up()?;
    }

    let ip = esp_wifi.ap_netif().get_ip_info()?.ip;
    log::info!(
        "SoftAP started. SSID: {} channel: {} ip: {}",
        creds.ssid,
        AP_CHANNEL,
        ip
    );
    Ok(SoftAp {
        wifi: esp_wifi,
        _stations: stations,
    })
}
