// Smell-It — Firmware Entry Point
//
// Boot sequence:
//   1. Classify the wake cause (before anything touches the RTC state).
//   2. Load AP credentials from NVS (defaults on first boot), start the SoftAP.
//   3. Initialise and calibrate the touch pad, arm it as a wake source.
//   4. Let the supply settle for 2 seconds, then bring up the TFT.
//   5. Report how long we slept, if this was a sleep wake.
//   6. Spawn display, TCP server, and power tasks.
//
// The system enters deep sleep 5 minutes after boot, whatever it is doing,
// and wakes again on touch.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!("smellit runs on ESP32 only; use `cargo test --lib` on the host");
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::thread;
    use std::time::Duration;

    use esp_idf_hal::gpio::{AnyIOPin, OutputPin, PinDriver};
    use esp_idf_hal::prelude::*;
    use esp_idf_hal::spi::config::{Config as SpiConfig, DriverConfig};
    use esp_idf_hal::spi::SpiDeviceDriver;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    use smellit::config::*;
    use smellit::credentials;
    use smellit::drivers::nvs::NvsCredentials;
    use smellit::drivers::rtc::{EspSleep, RtcSleepRecord};
    use smellit::drivers::st7735::St7735;
    use smellit::drivers::text::TextSurface;
    use smellit::drivers::touch_pad::EspTouchPad;
    use smellit::hal::SystemClock;
    use smellit::relay::RelayQueue;
    use smellit::sleep::DeepSleepScheduler;
    use smellit::{tasks, touch, wake, wifi};

    pub fn run() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("Smell-It firmware starting…");

        // ---- Wake cause ---------------------------------------------------
        let clock = SystemClock;
        let mut sleep_ctrl = EspSleep::new();
        let wake_event = wake::resolve_wake_event(&sleep_ctrl, &clock);

        // ---- Peripherals --------------------------------------------------
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs_partition = EspDefaultNvsPartition::take()?;

        // ---- SoftAP -------------------------------------------------------
        let mut store = NvsCredentials::open(nvs_partition.clone())?;
        let creds = credentials::load_credentials(&mut store)?;
        let _wifi = wifi::start_soft_ap(peripherals.modem, sysloop, nvs_partition, &creds)?;

        // ---- Touch wake source --------------------------------------------
        let mut pad = EspTouchPad::new(TOUCH_CHANNEL)?;
        let channel = touch::calibrate(&mut pad, TOUCH_CHANNEL);
        wake::register_wake_source(&mut sleep_ctrl, &channel)?;

        thread::sleep(BOOT_SETTLE_DELAY);

        // ---- Display ------------------------------------------------------
        let spi = SpiDeviceDriver::new_single(
            peripherals.spi2,
            peripherals.pins.gpio18,       // SCLK
            peripherals.pins.gpio23,       // MOSI
            Option::<AnyIOPin>::None,      // no MISO
            Some(peripherals.pins.gpio5),  // CS
            &DriverConfig::new(),
            &SpiConfig::new().baudrate(SPI_BAUDRATE_MHZ.MHz().into()),
        )?;
        let dc = PinDriver::output(peripherals.pins.gpio22.downgrade_output())?;
        let rst = PinDriver::output(peripherals.pins.gpio21.downgrade_output())?;
        let mut panel = St7735::new(spi, dc, rst);
        panel.init()?;
        let display = TextSurface::new(panel);

        // ---- Sleep bookkeeping --------------------------------------------
        let scheduler = DeepSleepScheduler::new(sleep_ctrl, RtcSleepRecord::new(), clock);
        scheduler.report_boot(&wake_event);

        // ---- Relay --------------------------------------------------------
        let (producer, consumer) = RelayQueue::new().split();

        // ---- Spawn tasks (map to FreeRTOS tasks via std::thread) -----------
        thread::Builder::new()
            .name("display".into())
            .stack_size(STACK_DISPLAY)
            .spawn(move || {
                tasks::display::display_task(consumer, display);
            })?;

        thread::Builder::new()
            .name("tcp_server".into())
            .stack_size(STACK_TCP)
            .spawn(move || {
                tasks::tcp::tcp_server_task(producer);
            })?;

        thread::Builder::new()
            .name("deep_sleep".into())
            .stack_size(STACK_SLEEP)
            .spawn(move || {
                tasks::power::power_task(scheduler);
            })?;

        // Main thread only keeps the Wi-Fi driver alive from here on.
        loop {
            thread::sleep(Duration::from_secs(60));
        }
    }
}
