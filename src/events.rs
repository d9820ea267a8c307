// Smell-It — System Events & Data Types

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Wall-clock timestamp (seconds + microseconds, like `struct timeval`)
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    pub secs: i64,
    pub micros: i32,
}

impl Timestamp {
    pub const ZERO: Self = Self { secs: 0, micros: 0 };

    pub fn new(secs: i64, micros: i32) -> Self {
        Self { secs, micros }
    }

    pub fn from_duration(d: Duration) -> Self {
        Self {
            secs: d.as_secs() as i64,
            micros: d.subsec_micros() as i32,
        }
    }

    fn as_micros(&self) -> i128 {
        self.secs as i128 * 1_000_000 + self.micros as i128
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `self` is not later.
    pub fn since(&self, earlier: Timestamp) -> Option<Duration> {
        let delta = self.as_micros() - earlier.as_micros();
        if delta <= 0 {
            return None;
        }
        u64::try_from(delta).ok().map(Duration::from_micros)
    }
}

// ---------------------------------------------------------------------------
// Wake cause as reported by the sleep controller, before classification
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawWakeCause {
    /// No wake source fired: power-on or hard reset.
    Undefined,
    Timer,
    /// Touch pad wake; carries the pad that crossed its threshold.
    Touchpad(u8),
    /// Any other wake source (ext0/ext1, GPIO, ULP, ...), by raw id.
    Other(u32),
}

// ---------------------------------------------------------------------------
// Wake event — classified once per boot
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCause {
    ColdStart,
    TimerExpiry,
    TouchWake(u8),
    Undefined,
}

impl WakeCause {
    /// True when the boot followed a deep sleep entered by this firmware.
    pub fn is_sleep_wake(&self) -> bool {
        !matches!(self, Self::ColdStart)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeEvent {
    pub cause: WakeCause,
    pub at: Timestamp,
}

impl WakeEvent {
    /// Channel that woke the device, present only for touch wakes.
    pub fn channel(&self) -> Option<u8> {
        match self.cause {
            WakeCause::TouchWake(ch) => Some(ch),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SoftAP station lifecycle
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationEvent {
    Joined { mac: [u8; 6], aid: u16 },
    Left { mac: [u8; 6], aid: u16, reason: u16 },
}

struct Mac<'a>(&'a [u8; 6]);

impl fmt::Display for Mac<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            m[0], m[1], m[2], m[3], m[4], m[5]
        )
    }
}

impl fmt::Display for StationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joined { mac, aid } => write!(f, "station {} join, AID={}", Mac(mac), aid),
            Self::Left { mac, aid, reason } => write!(
                f,
                "station {} leave, AID={}, reason={}",
                Mac(mac),
                aid,
                reason
            ),
        }
    }
}
