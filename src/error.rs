// Smell-It — Core error type
//
// Hardware bring-up uses `anyhow` at the boot boundary; everything the tasks
// must survive is expressed here so the task loops can match on it.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("touch pad {channel} read failed (code {code})")]
    SensorRead { channel: u8, code: i32 },

    #[error("touch pad {channel} threshold config failed (code {code})")]
    ThresholdConfig { channel: u8, code: i32 },

    #[error("wake source config failed (code {0})")]
    WakeConfig(i32),

    #[error("relay queue full for {0:?}")]
    QueueTimeout(Duration),

    #[error("relay queue has no peer")]
    QueueDisconnected,

    #[error("GPIO {pin} isolation failed (code {code})")]
    Isolation { pin: i32, code: i32 },

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
