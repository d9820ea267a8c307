// Smell-It — Hardware collaborator interfaces
//
// The core only talks to the chip through these traits. `drivers::*`
// implements them on top of ESP-IDF; the unit tests implement them in memory.

use std::time::{SystemTime, UNIX_EPOCH};

use embedded_graphics::pixelcolor::Rgb565;

use crate::error::Result;
use crate::events::{RawWakeCause, Timestamp};

/// Capacitive touch front end.
pub trait TouchSensor {
    /// One raw (unfiltered) reading. Lower means more capacitance.
    fn sample_raw(&mut self, channel: u8) -> Result<u16>;

    /// Program the hardware comparator. A threshold of 0 disables the pad.
    fn configure_threshold(&mut self, channel: u8, threshold: u16) -> Result<()>;
}

/// Deep-sleep and wake-up control.
pub trait SleepController {
    fn enable_wake_source(&mut self, channel: u8) -> Result<()>;

    /// Keep the RTC peripheral domain powered so the touch FSM runs in sleep.
    fn retain_rtc_peripherals(&mut self) -> Result<()>;

    fn wake_cause(&self) -> RawWakeCause;

    fn isolate_domain(&mut self, pin: i32) -> Result<()>;

    /// Powers down the main domain. The next code to run is the boot path.
    fn enter_deep_sleep(&mut self) -> !;
}

/// Text sink for the relay consumer. Drawing errors stay inside the driver.
pub trait TextDisplay {
    fn clear(&mut self);
    fn write_text(&mut self, text: &str, x: i32, y: i32, size: u8, color: Rgb565);

    /// Push buffered drawing to the panel, for displays that buffer.
    fn flush(&mut self) {}
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by `gettimeofday`, which ESP-IDF keeps running from the
/// RTC across deep sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Timestamp::from_duration)
            .unwrap_or(Timestamp::ZERO)
    }
}
