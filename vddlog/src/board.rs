//! Traits for abstracting away the board support layer

// Everything runs on a single-threaded cooperative executor, so none of the
// returned futures need to be `Send`.
#![allow(async_fn_in_trait)]

use crate::datalog::TimestampFormat;
use crate::display::Image;

/// Analog I/O driver that owns the SAADC and hides its slot allocation
pub trait AnalogDriver {
    type Pin: Copy;

    /// Makes sure a slot is allocated for `pin` and that the driver's own
    /// configuration of that slot has been (re)written to the peripheral.
    fn activate_channel(&mut self, pin: Self::Pin);

    /// Triggers a conversion on the slot of `pin` and returns the raw count
    async fn read_analog(&mut self, pin: Self::Pin) -> u16;
}

pub trait SerialPort {
    async fn write(&mut self, bytes: &[u8]);
}

/// 5×5 LED matrix
pub trait Display {
    /// Scrolls `text` across the matrix, returning once the animation is done
    async fn scroll(&mut self, text: &str);

    fn show(&mut self, image: &Image);

    fn set_pixel(&mut self, x: usize, y: usize, brightness: u8);
}

pub trait Button {
    fn is_pressed(&mut self) -> bool;
}

/// Append-only row store persisted across resets
pub trait DataLog {
    type Error;

    fn set_serial_mirroring(&mut self, enabled: bool);
    fn set_timestamp(&mut self, format: TimestampFormat) -> Result<(), Self::Error>;
    fn set_visible(&mut self, visible: bool) -> Result<(), Self::Error>;
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Appends a row of `(column, value)` pairs stamped with `timestamp_ms`
    fn log_row(&mut self, timestamp_ms: u64, columns: &[(&str, &str)]) -> Result<(), Self::Error>;

    fn is_full(&self) -> bool;

    /// The last row as written, if rows are to be mirrored to serial
    fn mirrored_row(&self) -> Option<&str>;
}

/// Board collaborators used by the monitor and the logger
pub struct Peripherals<S, D, B, T, L> {
    pub serial: S,
    pub display: D,
    pub button: B,
    pub time: T,
    pub log: L,
}
