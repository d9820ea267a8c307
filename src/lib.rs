// Smell-It — touch-wake message display firmware
//
// Platform-neutral core (calibration, wake classification, relay queue, sleep
// scheduling, task bodies) plus the ESP-IDF drivers that plug into it. The
// core builds on the host so it can be unit-tested there.

pub mod config;
pub mod credentials;
pub mod drivers;
pub mod error;
pub mod events;
pub mod hal;
pub mod relay;
pub mod sleep;
pub mod tasks;
pub mod touch;
pub mod wake;
#[cfg(target_os = "espidf")]
pub mod wifi;

pub use error::{Error, Result};
