//! Multiplexed 5×5 LED matrix.
//!
//! Rows are driven high and columns sink current, so a LED is lit while its
//! row is high and its column is low. A background task walks the rows and
//! approximates brightness by keeping each column low for a share of
//! [`PWM_STEPS`] slots per row.

use core::cell::Cell;
use embassy_nrf::gpio::{AnyPin, Output};
use embassy_sync::blocking_mutex::{raw::ThreadModeRawMutex, Mutex};
use embassy_time::{Duration, Timer};
use vddlog::board::Display;
use vddlog::constants::SCROLL_STEP_MS;
use vddlog::display::{Image, Scroller, HEIGHT, WIDTH};

const PWM_STEPS: u16 = 8;
const STEP_TIME: Duration = Duration::from_micros(250);

static FRAME: Mutex<ThreadModeRawMutex, Cell<Image>> = Mutex::new(Cell::new(Image::BLANK));

#[embassy_executor::task]
pub async fn refresh(
    mut rows: [Output<'static, AnyPin>; HEIGHT],
    mut columns: [Output<'static, AnyPin>; WIDTH],
) -> ! {
    loop {
        let image = FRAME.lock(|frame| frame.get());

        for (y, row) in rows.iter_mut().enumerate() {
            row.set_high();

            for step in 0..PWM_STEPS {
                let threshold = step * 256 / PWM_STEPS;
                for (x, column) in columns.iter_mut().enumerate() {
                    if image.pixel(x, y) as u16 > threshold {
                        column.set_low();
                    } else {
                        column.set_high();
                    }
                }
                Timer::after(STEP_TIME).await;
            }

            for column in columns.iter_mut() {
                column.set_high();
            }
            row.set_low();
        }
    }
}

/// Handle for changing what the [`refresh`] task shows
pub struct LedMatrix {
    _private: (),
}

impl LedMatrix {
    /// Must only be created once the refresh task has been spawned
    pub fn new() -> Self {
        FRAME.lock(|frame| frame.set(Image::BLANK));
        Self { _private: () }
    }
}

impl Display for LedMatrix {
    async fn scroll(&mut self, text: &str) {
        for frame in Scroller::new(text) {
            self.show(&frame);
            Timer::after_millis(SCROLL_STEP_MS).await;
        }
    }

    fn show(&mut self, image: &Image) {
        FRAME.lock(|frame| frame.set(*image));
    }

    fn set_pixel(&mut self, x: usize, y: usize, brightness: u8) {
        FRAME.lock(|frame| {
            let mut image = frame.get();
            image.set_pixel(x, y, brightness);
            frame.set(image);
        });
    }
}
