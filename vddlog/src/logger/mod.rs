//! Averaging logger mode.
//!
//! Samples VDD once per second and appends the mean of every
//! [`LOGGING_INTERVAL_SECS`] readings to the data log until it fills up.

use crate::board::{DataLog, Display, Peripherals, SerialPort};
use crate::constants::{IDLE_PERIOD_MS, LOGGING_INTERVAL_SECS, SAMPLE_PERIOD_MS};
use crate::datalog::TimestampFormat;
use crate::display::{Image, FULL, HEIGHT, WIDTH};
use crate::frame::LINE_END;
use crate::sampler::VddSource;
use crate::time::TimeDriver;
use arrayvec::ArrayString;
use core::fmt::Write;

mod window;
pub use window::AveragingWindow;

/// Name of the single data column
pub const COLUMN: &str = "mV";

/// Records averaged readings until the log is full, then shows the cross.
pub async fn record<V, S, D, B, T, L>(source: &mut V, p: &mut Peripherals<S, D, B, T, L>)
where
    V: VddSource,
    S: SerialPort,
    D: Display,
    T: TimeDriver,
    L: DataLog,
{
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            p.display.set_pixel(x, y, FULL);
        }
    }

    p.log.set_serial_mirroring(false);
    let prepared = p
        .log
        .set_timestamp(TimestampFormat::Seconds)
        .and_then(|_| p.log.clear())
        .and_then(|_| p.log.set_visible(true));

    if prepared.is_err() {
        error!("failed to prepare the data log");
    } else {
        info!("logging the average of every {} readings", LOGGING_INTERVAL_SECS);
        fill_log(source, p).await;
    }

    p.display.show(&Image::CROSS);
}

async fn fill_log<V, S, D, B, T, L>(source: &mut V, p: &mut Peripherals<S, D, B, T, L>)
where
    V: VddSource,
    S: SerialPort,
    T: TimeDriver,
    L: DataLog,
{
    let mut window = AveragingWindow::<LOGGING_INTERVAL_SECS>::new();
    let mut deadline = p.time.now_ms();

    while !p.log.is_full() {
        p.time.wait_until(deadline).await;
        deadline += SAMPLE_PERIOD_MS;

        let millivolts = source.read_millivolts().await;
        let Some(mean) = window.push(millivolts) else {
            continue;
        };

        let mut value = ArrayString::<10>::new();
        // A u32 has at most ten digits
        let _ = write!(value, "{}", mean);

        if p.log.log_row(p.time.now_ms(), &[(COLUMN, value.as_str())]).is_err() {
            error!("failed to append to the data log");
            break;
        }
        debug!("logged {} mV", mean);

        if let Some(row) = p.log.mirrored_row() {
            p.serial.write(row.as_bytes()).await;
            p.serial.write(LINE_END.as_bytes()).await;
        }
    }

    if p.log.is_full() {
        info!("data log is full");
    }
}

/// Sleeps forever
pub async fn idle<T: TimeDriver>(time: &T) -> ! {
    loop {
        time.wait(IDLE_PERIOD_MS).await;
    }
}

/// Enters logging mode for good
pub async fn run<V, S, D, B, T, L>(source: &mut V, p: &mut Peripherals<S, D, B, T, L>) -> !
where
    V: VddSource,
    S: SerialPort,
    D: Display,
    T: TimeDriver,
    L: DataLog,
{
    record(source, p).await;
    idle(&p.time).await
}
