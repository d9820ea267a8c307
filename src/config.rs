// Smell-It — Hardware & System Configuration
// Target: ESP32 DevKit + ST7735 1.8" TFT + copper touch electrode

use std::time::Duration;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions
// ---------------------------------------------------------------------------
pub const PIN_TFT_CS: i32 = 5;
pub const PIN_TFT_RST: i32 = 21;
pub const PIN_TFT_DC: i32 = 22;
pub const PIN_TFT_SCLK: i32 = 18;
pub const PIN_TFT_MOSI: i32 = 23;
pub const PIN_ISOLATE_IN_SLEEP: i32 = 12; // Strapping pin with external pull-up

// ---------------------------------------------------------------------------
// Touch Sensor
// ---------------------------------------------------------------------------
pub const TOUCH_CHANNEL: u8 = 0;                  // TOUCH_PAD_NUM0 = GPIO4
pub const TOUCH_CALIBRATION_SAMPLES: u32 = 128;
pub const TOUCH_MIN_VIABLE_READING: u16 = 300;    // Below this, SNR is too low
pub const TOUCH_THRESHOLD_MARGIN: u16 = 100;      // Raw units below baseline = touched

// ---------------------------------------------------------------------------
// Message Relay
// ---------------------------------------------------------------------------
pub const RELAY_MSG_SIZE: usize = 128;
pub const RELAY_QUEUE_LENGTH: usize = 5;
pub const RELAY_ENQUEUE_TIMEOUT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// TCP Server
// ---------------------------------------------------------------------------
pub const TCP_PORT: u16 = 3333;
pub const TCP_RX_BUFFER_SIZE: usize = RELAY_MSG_SIZE;
pub const KEEPALIVE_IDLE_S: i32 = 5;
pub const KEEPALIVE_INTERVAL_S: i32 = 5;
pub const KEEPALIVE_COUNT: i32 = 3;

// ---------------------------------------------------------------------------
// Soft Access Point
// ---------------------------------------------------------------------------
pub const NVS_WIFI_NAMESPACE: &str = "wifi_config";
pub const NVS_KEY_SSID: &str = "ssid";
pub const NVS_KEY_PASSWORD: &str = "password";
pub const DEFAULT_SSID: &str = "WIFI_ESP";
pub const DEFAULT_PASSWORD: &str = "87654321";
pub const AP_CHANNEL: u8 = 1;
pub const AP_MAX_CONNECTIONS: u16 = 4;
pub const WPA2_MIN_PASSWORD_LEN: usize = 8;

// ---------------------------------------------------------------------------
// Display (ST7735, BLACKTAB variant)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 160;
pub const TEXT_X: i32 = 20;
pub const TEXT_Y: i32 = 12;
pub const TEXT_SIZE: u8 = 3;
pub const SPI_BAUDRATE_MHZ: u32 = 26;

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_DISPLAY: usize = 4096;
pub const STACK_TCP: usize = 6144;
pub const STACK_SLEEP: usize = 4096;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------
pub const IDLE_BEFORE_SLEEP: Duration = Duration::from_secs(300); // 5 minutes → sleep
pub const BOOT_SETTLE_DELAY: Duration = Duration::from_millis(2000);
