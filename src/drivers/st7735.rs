// Smell-It — ST7735 TFT Driver
//
// Register-level driver for the 1.8" 128×160 "black tab" panel over SPI,
// with a full RGB565 framebuffer in RAM (40 KiB) pushed in one window write.

use std::thread;
use std::time::Duration;

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver};
use esp_idf_sys::EspError;

use crate::config::*;
use crate::drivers::text::FrameSink;

const WIDTH: usize = SCREEN_WIDTH as usize;
const HEIGHT: usize = SCREEN_HEIGHT as usize;

// ST7735 commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVOFF: u8 = 0x20;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// Black tab panels are mounted mirrored in both axes.
const MADCTL_MY: u8 = 0x80;
const MADCTL_MX: u8 = 0x40;

pub struct St7735 {
    spi: SpiDeviceDriver<'static, SpiDriver<'static>>,
    dc: PinDriver<'static, AnyOutputPin, Output>,
    rst: PinDriver<'static, AnyOutputPin, Output>,
    framebuffer: Vec<u8>,
}

impl St7735 {
    pub fn new(
        spi: SpiDeviceDriver<'static, SpiDriver<'static>>,
        dc: PinDriver<'static, AnyOutputPin, Output>,
        rst: PinDriver<'static, AnyOutputPin, Output>,
    ) -> Self {
        Self {
            spi,
            dc,
            rst,
            framebuffer: vec![0u8; WIDTH * HEIGHT * 2],
        }
    }

    /// Hardware reset, wake the controller, select RGB565 and switch on.
    pub fn init(&mut self) -> anyhow::Result<()> {
        self.rst.set_low()?;
        thread::sleep(Duration::from_millis(10));
        self.rst.set_high()?;
        thread::sleep(Duration::from_millis(120));

        self.command(SWRESET, &[])?;
        thread::sleep(Duration::from_millis(150));
        self.command(SLPOUT, &[])?;
        thread::sleep(Duration::from_millis(500));

        self.command(COLMOD, &[0x05])?;
        self.command(MADCTL, &[MADCTL_MY | MADCTL_MX])?;
        self.command(INVOFF, &[])?;
        self.command(NORON, &[])?;
        thread::sleep(Duration::from_millis(10));
        self.command(DISPON, &[])?;
        thread::sleep(Duration::from_millis(100));

        log::info!("ST7735 initialised ({}x{})", WIDTH, HEIGHT);
        Ok(())
    }

    fn command(&mut self, cmd: u8, data: &[u8]) -> Result<(), EspError> {
        self.dc.set_low()?;
        self.spi.write(&[cmd])?;
        if !data.is_empty() {
            self.dc.set_high()?;
            self.spi.write(data)?;
        }
        Ok(())
    }

    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), EspError> {
        let [xh0, xl0] = x0.to_be_bytes();
        let [xh1, xl1] = x1.to_be_bytes();
        let [yh0, yl0] = y0.to_be_bytes();
        let [yh1, yl1] = y1.to_be_bytes();
        self.command(CASET, &[xh0, xl0, xh1, xl1])?;
        self.command(RASET, &[yh0, yl0, yh1, yl1])
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb565) {
        if x >= 0 && (x as usize) < WIDTH && y >= 0 && (y as usize) < HEIGHT {
            let idx = (y as usize * WIDTH + x as usize) * 2;
            let raw: RawU16 = color.into();
            self.framebuffer[idx..idx + 2].copy_from_slice(&raw.into_inner().to_be_bytes());
        }
    }
}

impl OriginDimensions for St7735 {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for St7735 {
    type Color = Rgb565;
    type Error = EspError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let raw: RawU16 = color.into();
        let bytes = raw.into_inner().to_be_bytes();
        for chunk in self.framebuffer.chunks_exact_mut(2) {
            chunk.copy_from_slice(&bytes);
        }
        Ok(())
    }
}

impl FrameSink for St7735 {
    fn flush_frame(&mut self) -> Result<(), EspError> {
        self.set_window(0, 0, WIDTH as u16 - 1, HEIGHT as u16 - 1)?;
        self.dc.set_low()?;
        self.spi.write(&[RAMWR])?;
        self.dc.set_high()?;
        self.spi.write(&self.framebuffer)
    }
}
