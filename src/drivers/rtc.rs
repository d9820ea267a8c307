// Smell-It — Sleep controller and RTC-retained sleep record

use esp_idf_sys::{self as sys, esp};

use crate::error::{Error, Result};
use crate::events::{RawWakeCause, Timestamp};
use crate::hal::SleepController;
use crate::sleep::{SleepRecord, SleepRecordStore};

// ---------------------------------------------------------------------------
// Sleep controller
// ---------------------------------------------------------------------------

pub struct EspSleep {
    _private: (),
}

impl EspSleep {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl SleepController for EspSleep {
    fn enable_wake_source(&mut self, _channel: u8) -> Result<()> {
        // Touch wakeup is global on the ESP32: every pad with a non-zero
        // threshold can wake the chip.
        unsafe { esp!(sys::esp_sleep_enable_touchpad_wakeup()) }
            .map_err(|e| Error::WakeConfig(e.code()))
    }

    fn retain_rtc_peripherals(&mut self) -> Result<()> {
        unsafe {
            esp!(sys::esp_sleep_pd_config(
                sys::esp_sleep_pd_domain_t_ESP_PD_DOMAIN_RTC_PERIPH,
                sys::esp_sleep_pd_option_t_ESP_PD_OPTION_ON,
            ))
        }
        .map_err(|e| Error::WakeConfig(e.code()))
    }

    fn wake_cause(&self) -> RawWakeCause {
        let cause = unsafe { sys::esp_sleep_get_wakeup_cause() };
        match cause {
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_UNDEFINED => RawWakeCause::Undefined,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER => RawWakeCause::Timer,
            sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TOUCHPAD => {
                let pad = unsafe { sys::esp_sleep_get_touchpad_wakeup_status() };
                RawWakeCause::Touchpad(pad as u8)
            }
            other => RawWakeCause::Other(other as u32),
        }
    }

    fn isolate_domain(&mut self, pin: i32) -> Result<()> {
        unsafe { esp!(sys::rtc_gpio_isolate(pin as sys::gpio_num_t)) }
            .map_err(|e| Error::Isolation { pin, code: e.code() })
    }

    fn enter_deep_sleep(&mut self) -> ! {
        unsafe { sys::esp_deep_sleep_start() }
    }
}

// ---------------------------------------------------------------------------
// Sleep record in RTC slow memory
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Clone, Copy)]
struct RawRecord {
    secs: i64,
    micros: i32,
}

// Zeroed from the image on a full reset; kept across deep sleep.
#[link_section = ".rtc.data.sleep_record"]
static mut SLEEP_RECORD: RawRecord = RawRecord { secs: 0, micros: 0 };

/// Handle on the single RTC record. Only the boot path reads it and only the
/// power task writes it, never at the same time.
pub struct RtcSleepRecord {
    _private: (),
}

impl RtcSleepRecord {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl SleepRecordStore for RtcSleepRecord {
    fn load(&self) -> SleepRecord {
        // SAFETY: see type docs; volatile because the value outlives this boot.
        let raw = unsafe { core::ptr::read_volatile(core::ptr::addr_of!(SLEEP_RECORD)) };
        SleepRecord {
            entry: Timestamp::new(raw.secs, raw.micros),
        }
    }

    fn store(&mut self, record: SleepRecord) {
        let raw = RawRecord {
            secs: record.entry.secs,
            micros: record.entry.micros,
        };
        unsafe { core::ptr::write_volatile(core::ptr::addr_of_mut!(SLEEP_RECORD), raw) };
    }
}
