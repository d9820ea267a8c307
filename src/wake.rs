// Smell-It — Wake-Source Coordinator
//
// Arms a calibrated touch channel as a deep-sleep wake trigger and classifies
// the hardware wake cause once per boot.

use crate::error::Result;
use crate::events::{RawWakeCause, WakeCause, WakeEvent};
use crate::hal::{Clock, SleepController};
use crate::touch::SensorChannel;

/// Outcome of [`register_wake_source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Armed(u8),
    /// Channel was disabled by calibration; only timer or reset can wake us.
    Skipped(u8),
}

/// Arm `channel` for touch wake-up and keep the RTC peripherals powered in
/// sleep.
///
/// Taking a [`SensorChannel`] guarantees calibration already programmed the
/// comparator. A disabled channel is a no-op, not an error.
pub fn register_wake_source<S: SleepController>(
    ctrl: &mut S,
    channel: &SensorChannel,
) -> Result<Registration> {
    if !channel.is_enabled() {
        log::warn!(
            "Touch pad #{} disabled — touch wakeup not available",
            channel.id()
        );
        return Ok(Registration::Skipped(channel.id()));
    }

    log::info!("Enabling touch pad #{} wakeup", channel.id());
    ctrl.enable_wake_source(channel.id())?;
    ctrl.retain_rtc_peripherals()?;
    Ok(Registration::Armed(channel.id()))
}

/// Map the controller's raw cause onto the boot-level classification.
pub fn classify(raw: RawWakeCause) -> WakeCause {
    match raw {
        RawWakeCause::Undefined => WakeCause::ColdStart,
        RawWakeCause::Timer => WakeCause::TimerExpiry,
        RawWakeCause::Touchpad(pad) => WakeCause::TouchWake(pad),
        RawWakeCause::Other(_) => WakeCause::Undefined,
    }
}

/// Read the wake-cause registers and stamp the result. Call once at boot.
pub fn resolve_wake_event<S: SleepController, C: Clock>(ctrl: &S, clock: &C) -> WakeEvent {
    let raw = ctrl.wake_cause();
    let event = WakeEvent {
        cause: classify(raw),
        at: clock.now(),
    };
    log::debug!("Wake cause {:?} -> {:?}", raw, event.cause);
    event
}
