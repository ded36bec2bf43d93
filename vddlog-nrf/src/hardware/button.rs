use embassy_nrf::gpio::{AnyPin, Input, Pull};
use vddlog::board::Button;

/// Push button pulling its pin to ground when pressed
pub struct ActiveLowButton {
    input: Input<'static, AnyPin>,
}

impl ActiveLowButton {
    pub fn new(pin: AnyPin) -> Self {
        Self {
            input: Input::new(pin, Pull::Up),
        }
    }
}

impl Button for ActiveLowButton {
    fn is_pressed(&mut self) -> bool {
        self.input.is_low()
    }
}
