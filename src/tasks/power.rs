// Smell-It — Power Management Task
//
// Waits out the fixed idle interval, then takes the device into deep sleep.
// Nothing cancels or postpones the timer.

use std::thread;

use crate::hal::{Clock, SleepController};
use crate::sleep::{DeepSleepScheduler, SleepRecordStore};

pub fn power_task<S, R, C>(mut scheduler: DeepSleepScheduler<S, R, C>) -> !
where
    S: SleepController,
    R: SleepRecordStore,
    C: Clock,
{
    log::info!(
        "Power task started — deep sleep in {} s",
        scheduler.idle().as_secs()
    );

    thread::sleep(scheduler.idle());

    scheduler.prepare();
    scheduler.sleep()
}
