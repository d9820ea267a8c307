// Smell-It — Text rendering onto any RGB565 frame
//
// Adapts an embedded-graphics draw target to the `TextDisplay` interface the
// display task uses. Text wraps at the right edge back to column 0, the way
// the Adafruit GFX cursor does.

use core::fmt::Debug;

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_9X18};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

use crate::hal::TextDisplay;

/// A draw target that buffers and needs an explicit push to the panel.
pub trait FrameSink: DrawTarget<Color = Rgb565> + OriginDimensions {
    fn flush_frame(&mut self) -> Result<(), Self::Error>;
}

/// Closest mono font to a GFX text size (6×8 cell per size step).
pub fn font_for_size(size: u8) -> &'static MonoFont<'static> {
    match size {
        0 | 1 => &FONT_6X10,
        2 => &FONT_9X18,
        _ => &FONT_10X20,
    }
}

/// Break `text` into `(x, line)` pairs for a surface `width` pixels wide.
/// The first line starts at `x`, continuation lines at 0.
pub fn wrap_lines(text: &str, x: i32, width: i32, char_w: i32) -> Vec<(i32, &str)> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut line_x = x;
    let mut cursor = x;

    for (i, _) in text.char_indices() {
        if cursor + char_w > width && i > start {
            lines.push((line_x, &text[start..i]));
            start = i;
            line_x = 0;
            cursor = 0;
        }
        cursor += char_w;
    }
    if start < text.len() {
        lines.push((line_x, &text[start..]));
    }
    lines
}

pub struct TextSurface<D> {
    target: D,
}

impl<D: FrameSink> TextSurface<D> {
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn into_inner(self) -> D {
        self.target
    }
}

impl<D> TextDisplay for TextSurface<D>
where
    D: FrameSink,
    D::Error: Debug,
{
    fn clear(&mut self) {
        if let Err(e) = DrawTarget::clear(&mut self.target, Rgb565::BLACK) {
            log::warn!("Display clear failed: {:?}", e);
        }
    }

    fn write_text(&mut self, text: &str, x: i32, y: i32, size: u8, color: Rgb565) {
        let font = font_for_size(size);
        let style = MonoTextStyle::new(font, color);
        let char_w = (font.character_size.width + font.character_spacing) as i32;
        let char_h = font.character_size.height as i32;
        let width = self.target.size().width as i32;

        for (row, (line_x, line)) in wrap_lines(text, x, width, char_w).into_iter().enumerate() {
            let origin = Point::new(line_x, y + row as i32 * char_h);
            if let Err(e) = Text::with_baseline(line, origin, style, Baseline::Top).draw(&mut self.target) {
                log::warn!("Display text draw failed: {:?}", e);
                return;
            }
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.target.flush_frame() {
            log::warn!("Display flush failed: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use core::convert::Infallible;

    struct Canvas {
        px: Vec<Rgb565>,
        flushes: usize,
    }

    impl Canvas {
        fn new() -> Self {
            Self {
                px: vec![Rgb565::RED; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
                flushes: 0,
            }
        }

        fn count(&self, color: Rgb565) -> usize {
            self.px.iter().filter(|&&p| p == color).count()
        }
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
        }
    }

    impl DrawTarget for Canvas {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, c) in pixels {
                if p.x >= 0 && p.y >= 0 && (p.x as u32) < SCREEN_WIDTH && (p.y as u32) < SCREEN_HEIGHT {
                    self.px[(p.y as u32 * SCREEN_WIDTH + p.x as u32) as usize] = c;
                }
            }
            Ok(())
        }
    }

    impl FrameSink for Canvas {
        fn flush_frame(&mut self) -> Result<(), Infallible> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn clear_blanks_whole_surface() {
        let mut surface = TextSurface::new(Canvas::new());
        surface.clear();
        let canvas = surface.into_inner();
        assert_eq!(canvas.count(Rgb565::BLACK), canvas.px.len());
    }

    #[test]
    fn text_is_drawn_inside_the_field() {
        let mut surface = TextSurface::new(Canvas::new());
        surface.clear();
        surface.write_text("hello", TEXT_X, TEXT_Y, TEXT_SIZE, Rgb565::GREEN);
        surface.flush();
        let canvas = surface.into_inner();

        assert!(canvas.count(Rgb565::GREEN) > 0);
        assert_eq!(canvas.flushes, 1);
        // Nothing above the field's top edge.
        let above = &canvas.px[..(TEXT_Y as u32 * SCREEN_WIDTH) as usize];
        assert!(above.iter().all(|&p| p == Rgb565::BLACK));
    }

    #[test]
    fn long_lines_wrap_to_column_zero() {
        // 10 px cells, first line from x=20 on a 128 px panel fits 10 chars.
        let lines = wrap_lines("abcdefghijklmnopqrstuvw", 20, 128, 10);
        assert_eq!(
            lines,
            vec![(20, "abcdefghij"), (0, "klmnopqrstuv"), (0, "w")]
        );
    }

    #[test]
    fn empty_text_has_no_lines() {
        assert!(wrap_lines("", 20, 128, 10).is_empty());
    }

    #[test]
    fn gfx_sizes_map_to_fonts() {
        assert_eq!(font_for_size(1).character_size, FONT_6X10.character_size);
        assert_eq!(font_for_size(3).character_size, FONT_10X20.character_size);
    }
}
