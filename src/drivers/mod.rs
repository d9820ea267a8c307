pub mod text;

#[cfg(target_os = "espidf")]
pub mod nvs;
#[cfg(target_os = "espidf")]
pub mod rtc;
#[cfg(target_os = "espidf")]
pub mod st7735;
#[cfg(target_os = "espidf")]
pub mod touch_pad;
