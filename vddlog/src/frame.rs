//! Text of a live monitor reading as shown on the matrix and sent over serial

use arrayvec::ArrayString;
use core::fmt::Write;

pub const UNIT: &str = " mV";
pub const LINE_END: &str = "\r\n";

/// Large enough for any `u32` reading, the unit and the line end
pub type FrameText = ArrayString<16>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    MissingUnit,
    InvalidNumber,
}

/// `"<mV> mV"`, the text scrolled across the display
pub fn reading_text(millivolts: u32) -> FrameText {
    let mut text = FrameText::new();
    // Ten digits plus the unit always fit
    let _ = write!(text, "{}{}", millivolts, UNIT);
    text
}

/// `"<mV> mV\r\n"`, one line of the serial stream
pub fn serial_frame(millivolts: u32) -> FrameText {
    let mut frame = reading_text(millivolts);
    frame.push_str(LINE_END);
    frame
}

/// Extracts the reading from one line of the serial stream
pub fn parse(line: &str) -> Result<u32, FrameError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let value = line.strip_suffix(UNIT).ok_or(FrameError::MissingUnit)?;
    value.parse().map_err(|_| FrameError::InvalidNumber)
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::MissingUnit => write!(f, "line does not end in \"{}\"", UNIT),
            FrameError::InvalidNumber => write!(f, "reading is not a decimal number"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}
