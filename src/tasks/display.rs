// Smell-It — Display Task
//
// Sole consumer of the relay queue. Blocks for the next message and replaces
// the whole screen with it; a burst of messages is shown one by one, in order,
// never coalesced.

use std::thread;

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

use crate::config::*;
use crate::error::Error;
use crate::hal::TextDisplay;
use crate::relay::{RelayConsumer, RelayMessage};

pub fn display_task<D: TextDisplay>(relay: RelayConsumer, mut display: D) -> ! {
    log::info!("Display task started");

    let e = show_messages(&relay, &mut display);
    log::warn!("Relay closed ({}), display keeps its last frame", e);

    // Dropping the panel would release its control pins.
    loop {
        thread::park();
    }
}

/// Render every message until the queue reports an error, then return it.
pub fn show_messages<D: TextDisplay>(relay: &RelayConsumer, display: &mut D) -> Error {
    display.clear();
    display.flush();

    loop {
        match relay.dequeue() {
            Ok(msg) => render(display, &msg),
            Err(e) => return e,
        }
    }
}

/// Total replace: clear, then draw the message in the fixed text field.
pub fn render<D: TextDisplay>(display: &mut D, msg: &RelayMessage) {
    log::debug!("Rendering {} bytes", msg.len());
    display.clear();
    display.write_text(&msg.as_text(), TEXT_X, TEXT_Y, TEXT_SIZE, Rgb565::GREEN);
    display.flush();
}
