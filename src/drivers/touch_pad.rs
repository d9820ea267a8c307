// Smell-It — ESP32 Touch Pad Driver
//
// Thin wrapper over the legacy ESP-IDF touch sensor API. The FSM runs from
// the hardware timer so the comparator keeps working in deep sleep.

use esp_idf_sys::{self as sys, esp};

use crate::error::{Error, Result};
use crate::hal::TouchSensor;
use crate::touch::Threshold;

pub struct EspTouchPad {
    _private: (),
}

impl EspTouchPad {
    /// Start the touch FSM and pre-configure `channel` with the comparator
    /// off, ready for calibration.
    pub fn new(channel: u8) -> anyhow::Result<Self> {
        unsafe {
            esp!(sys::touch_pad_init())?;
            esp!(sys::touch_pad_set_fsm_mode(
                sys::touch_fsm_mode_t_TOUCH_FSM_MODE_TIMER
            ))?;
            esp!(sys::touch_pad_set_voltage(
                sys::touch_high_volt_t_TOUCH_HVOLT_2V5,
                sys::touch_low_volt_t_TOUCH_LVOLT_0V5,
                sys::touch_volt_atten_t_TOUCH_HVOLT_ATTEN_1V,
            ))?;
            esp!(sys::touch_pad_config(
                channel as sys::touch_pad_t,
                Threshold::Disabled.raw()
            ))?;
        }
        log::info!("Touch pad #{} initialised", channel);
        Ok(Self { _private: () })
    }
}

impl TouchSensor for EspTouchPad {
    fn sample_raw(&mut self, channel: u8) -> Result<u16> {
        let mut value: u16 = 0;
        unsafe { esp!(sys::touch_pad_read(channel as sys::touch_pad_t, &mut value)) }
            .map_err(|e| Error::SensorRead {
                channel,
                code: e.code(),
            })?;
        log::trace!("Touch pad #{} raw {}", channel, value);
        Ok(value)
    }

    fn configure_threshold(&mut self, channel: u8, threshold: u16) -> Result<()> {
        unsafe { esp!(sys::touch_pad_config(channel as sys::touch_pad_t, threshold)) }.map_err(
            |e| Error::ThresholdConfig {
                channel,
                code: e.code(),
            },
        )
    }
}
