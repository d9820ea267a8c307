// Smell-It — Deep-Sleep Scheduler
//
// Active --(idle interval)--> Preparing --(record written)--> Asleep
//
// The timer is not traffic-aware: it fires regardless of display or network
// activity, and a connected TCP client is cut off when the chip goes down.
// On the next boot the firmware starts over in `Active` and reports how long
// it slept from the record left in RTC memory.

use std::time::Duration;

use crate::config::*;
use crate::events::{Timestamp, WakeCause, WakeEvent};
use crate::hal::{Clock, SleepController};

/// Survives deep sleep (RTC slow memory) but not a full reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SleepRecord {
    pub entry: Timestamp,
}

/// Storage for the [`SleepRecord`]. Written only by the scheduler right before
/// sleep; read only on the boot path.
pub trait SleepRecordStore {
    fn load(&self) -> SleepRecord;
    fn store(&mut self, record: SleepRecord);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepState {
    Active,
    Preparing,
    Asleep,
}

/// Time spent asleep, or `None` on a cold start (the record is zero then) or
/// when the clock did not move forward.
pub fn elapsed_sleep(event: &WakeEvent, record: &SleepRecord) -> Option<Duration> {
    if !event.cause.is_sleep_wake() {
        return None;
    }
    event.at.since(record.entry)
}

pub struct DeepSleepScheduler<S, R, C> {
    ctrl: S,
    record: R,
    clock: C,
    idle: Duration,
    isolate: &'static [i32],
    state: SleepState,
}

impl<S, R, C> DeepSleepScheduler<S, R, C>
where
    S: SleepController,
    R: SleepRecordStore,
    C: Clock,
{
    pub fn new(ctrl: S, record: R, clock: C) -> Self {
        Self {
            ctrl,
            record,
            clock,
            idle: IDLE_BEFORE_SLEEP,
            isolate: &[PIN_ISOLATE_IN_SLEEP],
            state: SleepState::Active,
        }
    }

    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    pub fn state(&self) -> SleepState {
        self.state
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// Log the wake cause and, after a sleep wake, the time spent asleep.
    pub fn report_boot(&self, event: &WakeEvent) -> Option<Duration> {
        let elapsed = elapsed_sleep(event, &self.record.load());
        let ms = elapsed.map(|d| d.as_millis()).unwrap_or(0);

        match event.cause {
            WakeCause::TouchWake(pad) => {
                log::info!("Wake up from touch on pad {}", pad);
                log::info!("Sleep time: {}ms", ms);
            }
            WakeCause::TimerExpiry => {
                log::info!("Wake up from timer. Sleep time: {}ms", ms);
            }
            WakeCause::Undefined => {
                log::info!("Wake up from unexpected source. Sleep time: {}ms", ms);
            }
            WakeCause::ColdStart => log::info!("Not a deep sleep reset"),
        }
        elapsed
    }

    /// `Active -> Preparing`: isolate GPIOs, then stamp the record.
    ///
    /// Isolation failures only cost leakage current, so they are logged and
    /// the transition continues.
    pub fn prepare(&mut self) {
        self.state = SleepState::Preparing;

        for &pin in self.isolate {
            if let Err(e) = self.ctrl.isolate_domain(pin) {
                log::warn!("{}, sleeping anyway", e);
            }
        }

        let entry = self.clock.now();
        self.record.store(SleepRecord { entry });
        log::debug!("Sleep entry stamped at {}.{:06}", entry.secs, entry.micros);
    }

    /// `Preparing -> Asleep`. Does not return.
    pub fn sleep(&mut self) -> ! {
        self.state = SleepState::Asleep;
        log::info!("Entering deep sleep");
        self.ctrl.enter_deep_sleep()
    }
}
