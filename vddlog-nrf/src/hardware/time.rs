use embassy_time::{Instant, Timer};
use vddlog::time::TimeDriver;

pub struct EmbassyTime;

impl TimeDriver for EmbassyTime {
    type TimerFut = Timer;

    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn wait_until(&self, deadline_ms: u64) -> Self::TimerFut {
        Timer::at(Instant::from_millis(deadline_ms))
    }
}
