use crate::board::{AnalogDriver, Button, DataLog, Display, Peripherals, SerialPort};
use crate::saadc::ChannelRegisters;
use crate::sampler::VddSampler;
use crate::time::TimeDriver;
use crate::{logger, monitor};

/// Firmware main sequence: bind the sampler, monitor live until button A
/// is pressed, then log averages until the log is full and freeze.
pub async fn run<A, R, S, D, B, T, L>(
    mut sampler: VddSampler<A, R>,
    mut p: Peripherals<S, D, B, T, L>,
) -> !
where
    A: AnalogDriver,
    R: ChannelRegisters,
    S: SerialPort,
    D: Display,
    B: Button,
    T: TimeDriver,
    L: DataLog,
{
    sampler.init().await;
    monitor::run_until_button(&mut sampler, &mut p).await;
    logger::run(&mut sampler, &mut p).await
}
