#![no_std]
#![no_main]

use defmt_rtt as _; // global logger
use panic_probe as _; // global panic handler

defmt::timestamp!("{=u64}", embassy_time::Instant::now().as_millis());

mod hardware;
mod setup;

#[embassy_executor::main]
async fn main(spawner: embassy_executor::Spawner) {
    let p = embassy_nrf::init(Default::default());
    defmt::info!("vddlog starting");

    let (sampler, board) = setup::board(&spawner, p).await;
    vddlog::app::run(sampler, board).await
}
