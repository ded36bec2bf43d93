//! Live monitor mode: streams and scrolls one reading per second.

use crate::board::{Button, Display, Peripherals, SerialPort};
use crate::constants::MONITOR_PERIOD_MS;
use crate::frame;
use crate::sampler::VddSource;
use crate::time::TimeDriver;

/// Runs the live monitor until button A is seen pressed.
///
/// Each tick samples once, sends the reading over serial, scrolls it across
/// the display and then sleeps for [`MONITOR_PERIOD_MS`] on top of the
/// animation.
pub async fn run_until_button<V, S, D, B, T, L>(source: &mut V, p: &mut Peripherals<S, D, B, T, L>)
where
    V: VddSource,
    S: SerialPort,
    D: Display,
    B: Button,
    T: TimeDriver,
{
    loop {
        let millivolts = source.read_millivolts().await;
        let line = frame::serial_frame(millivolts);

        p.serial.write(line.as_bytes()).await;
        p.display.scroll(line.trim_end()).await;

        if p.button.is_pressed() {
            info!("button pressed, switching to logging mode");
            return;
        }

        p.time.wait(MONITOR_PERIOD_MS).await;
    }
}
