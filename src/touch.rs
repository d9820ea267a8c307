// Smell-It — Touch Calibration & Threshold Unit
//
// Samples the pad at start-up while nobody is touching it, averages the
// readings into a baseline, and derives the comparator threshold the hardware
// uses to wake the chip. There is no recalibration: the channel is immutable
// until the next reboot.

use crate::config::*;
use crate::error::Result;
use crate::hal::TouchSensor;

/// Comparator setting for one pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Signal too weak (or unreadable) to tell a touch from noise.
    Disabled,
    /// A reading below this value means "touched".
    Armed(u16),
}

impl Threshold {
    /// Value written to the hardware comparator; 0 turns the pad off.
    pub fn raw(&self) -> u16 {
        match self {
            Self::Disabled => 0,
            Self::Armed(t) => *t,
        }
    }
}

/// A calibrated touch channel. Only [`calibrate`] can produce one, so anything
/// holding a `SensorChannel` knows calibration has already run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorChannel {
    channel: u8,
    baseline: u16,
    threshold: Threshold,
}

impl SensorChannel {
    pub fn id(&self) -> u8 {
        self.channel
    }

    /// Average raw reading taken at start-up (0 if sampling failed).
    pub fn baseline(&self) -> u16 {
        self.baseline
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.threshold, Threshold::Armed(_))
    }
}

/// Threshold for a given noise-floor average.
pub fn derive_threshold(average: u16) -> Threshold {
    if average < TOUCH_MIN_VIABLE_READING {
        Threshold::Disabled
    } else {
        Threshold::Armed(average - TOUCH_THRESHOLD_MARGIN)
    }
}

/// Integer mean of [`TOUCH_CALIBRATION_SAMPLES`] raw readings.
fn average_reading<T: TouchSensor>(sensor: &mut T, channel: u8) -> Result<u16> {
    let mut sum: u32 = 0;
    for _ in 0..TOUCH_CALIBRATION_SAMPLES {
        sum += u32::from(sensor.sample_raw(channel)?);
    }
    Ok((sum / TOUCH_CALIBRATION_SAMPLES) as u16)
}

/// Calibrate `channel` and program its comparator.
///
/// Never fails: any read or configuration error leaves the channel disabled so
/// a bad pad can never become a spurious wake source.
pub fn calibrate<T: TouchSensor>(sensor: &mut T, channel: u8) -> SensorChannel {
    let baseline = match average_reading(sensor, channel) {
        Ok(avg) => avg,
        Err(e) => {
            log::error!("Touch pad #{} calibration aborted: {}", channel, e);
            return disabled(sensor, channel, 0);
        }
    };

    match derive_threshold(baseline) {
        Threshold::Disabled => {
            log::warn!(
                "Touch pad #{} average reading is too low: {} (expecting at least {}). \
                 Not using for deep sleep wakeup.",
                channel,
                baseline,
                TOUCH_MIN_VIABLE_READING
            );
            disabled(sensor, channel, baseline)
        }
        Threshold::Armed(threshold) => match sensor.configure_threshold(channel, threshold) {
            Ok(()) => {
                log::info!(
                    "Touch pad #{} average: {}, wakeup threshold set to {}",
                    channel,
                    baseline,
                    threshold
                );
                SensorChannel {
                    channel,
                    baseline,
                    threshold: Threshold::Armed(threshold),
                }
            }
            Err(e) => {
                log::error!("Touch pad #{} threshold rejected: {}", channel, e);
                disabled(sensor, channel, baseline)
            }
        },
    }
}

fn disabled<T: TouchSensor>(sensor: &mut T, channel: u8, baseline: u16) -> SensorChannel {
    if let Err(e) = sensor.configure_threshold(channel, Threshold::Disabled.raw()) {
        log::warn!("Touch pad #{} could not be switched off: {}", channel, e);
    }
    SensorChannel {
        channel,
        baseline,
        threshold: Threshold::Disabled,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::Error;

    /// Replays a fixed reading; optionally fails after `fail_after` samples.
    pub(crate) struct MockPad {
        pub reading: u16,
        pub fail_after: Option<u32>,
        pub reject_config: bool,
        pub samples: u32,
        pub configured: Vec<(u8, u16)>,
    }

    impl MockPad {
        pub(crate) fn steady(reading: u16) -> Self {
            Self {
                reading,
                fail_after: None,
                reject_config: false,
                samples: 0,
                configured: Vec::new(),
            }
        }
    }

    impl TouchSensor for MockPad {
        fn sample_raw(&mut self, channel: u8) -> Result<u16> {
            if self.fail_after.is_some_and(|n| self.samples >= n) {
                return Err(Error::SensorRead { channel, code: -1 });
            }
            self.samples += 1;
            Ok(self.reading)
        }

        fn configure_threshold(&mut self, channel: u8, threshold: u16) -> Result<()> {
            if self.reject_config && threshold != 0 {
                return Err(Error::ThresholdConfig { channel, code: 0x102 });
            }
            self.configured.push((channel, threshold));
            Ok(())
        }
    }

    #[test]
    fn strong_signal_arms_baseline_minus_margin() {
        let mut pad = MockPad::steady(900);
        let ch = calibrate(&mut pad, 0);
        assert!(ch.is_enabled());
        assert_eq!(ch.baseline(), 900);
        assert_eq!(ch.threshold(), Threshold::Armed(800));
        assert_eq!(pad.samples, TOUCH_CALIBRATION_SAMPLES);
        assert_eq!(pad.configured, vec![(0, 800)]);
    }

    #[test]
    fn weak_signal_disables_channel() {
        let mut pad = MockPad::steady(250);
        let ch = calibrate(&mut pad, 0);
        assert!(!ch.is_enabled());
        assert_eq!(ch.threshold(), Threshold::Disabled);
        assert_eq!(pad.configured, vec![(0, 0)]);
    }

    #[test]
    fn minimum_viable_reading_is_inclusive() {
        assert_eq!(derive_threshold(299), Threshold::Disabled);
        assert_eq!(derive_threshold(300), Threshold::Armed(200));
    }

    #[test]
    fn average_uses_integer_division() {
        // Alternating 400/401 averages to 400.5, truncated to 400.
        struct Alternating(u32);
        impl TouchSensor for Alternating {
            fn sample_raw(&mut self, _: u8) -> Result<u16> {
                self.0 += 1;
                Ok(if self.0 % 2 == 0 { 401 } else { 400 })
            }
            fn configure_threshold(&mut self, _: u8, _: u16) -> Result<()> {
                Ok(())
            }
        }
        let ch = calibrate(&mut Alternating(0), 2);
        assert_eq!(ch.baseline(), 400);
        assert_eq!(ch.threshold(), Threshold::Armed(300));
        assert_eq!(ch.id(), 2);
    }

    #[test]
    fn read_failure_leaves_channel_disabled() {
        let mut pad = MockPad::steady(900);
        pad.fail_after = Some(10);
        let ch = calibrate(&mut pad, 0);
        assert!(!ch.is_enabled());
        assert_eq!(ch.baseline(), 0);
        assert_eq!(pad.configured, vec![(0, 0)]);
    }

    #[test]
    fn rejected_threshold_leaves_channel_disabled() {
        let mut pad = MockPad::steady(900);
        pad.reject_config = true;
        let ch = calibrate(&mut pad, 0);
        assert!(!ch.is_enabled());
        assert_eq!(ch.baseline(), 900);
        assert_eq!(pad.configured, vec![(0, 0)]);
    }
}
