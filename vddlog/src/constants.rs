/// Number of one-second samples averaged into a single log row
pub const LOGGING_INTERVAL_SECS: usize = 60;

/// Time between two logger samples
pub const SAMPLE_PERIOD_MS: u64 = 1_000;
/// Pause between two live monitor ticks, on top of the scroll animation
pub const MONITOR_PERIOD_MS: u64 = 1_000;
/// Tick of the idle loop once the log is full
pub const IDLE_PERIOD_MS: u64 = 1_000;

/// SAADC resolution configured on the driver
pub const RESOLUTION_BITS: u32 = 10;
/// Number of channel slots in the SAADC channel table
pub const CHANNEL_COUNT: usize = 8;

/// Internal reference voltage of the SAADC in millivolts
pub const REFERENCE_MV: u32 = 600;
/// Inverse of the 1/6 channel gain
pub const GAIN_DIVISOR: u32 = 6;

/// How long each scroll position stays on the LED matrix
pub const SCROLL_STEP_MS: u64 = 120;

/// Size of a single record in the flash log
pub const LOG_RECORD_SIZE: usize = 32;
pub const LOG_MAGIC: &[u8; 4] = b"VDDL";
pub const LOG_FORMAT_VERSION: u8 = 1;
