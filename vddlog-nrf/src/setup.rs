use crate::hardware::{
    analog::{Analog, EdgePin0},
    button::ActiveLowButton,
    led_matrix::{self, LedMatrix},
    registers::SaadcChannels,
    serial::Serial,
    time::EmbassyTime,
};
use embassy_executor::Spawner;
use embassy_nrf::{
    bind_interrupts,
    gpio::{AnyPin, Level, Output, OutputDrive, Pin},
    nvmc::Nvmc,
    peripherals, saadc, uarte,
};
use vddlog::{board::Peripherals, datalog::FlashLog, VddSampler};

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

/// Data log region, the last 64K of the 512K flash and kept out of `memory.x`
const LOG_START: u32 = 0x7_0000;
const LOG_LENGTH: u32 = 0x1_0000;

const SERIAL_BAUDRATE: uarte::Baudrate = uarte::Baudrate::BAUD115200;

pub type Board =
    Peripherals<Serial, LedMatrix, ActiveLowButton, EmbassyTime, FlashLog<Nvmc<'static>>>;
pub type Sampler = VddSampler<Analog, SaadcChannels>;

async fn setup_analog(peripheral: peripherals::SAADC, edge_p0: peripherals::P0_02) -> Sampler {
    defmt::info!("Configuring SAADC");

    let mut config = saadc::Config::default();
    config.resolution = saadc::Resolution::_10BIT;
    let channel = saadc::ChannelConfig::single_ended(edge_p0);

    let saadc = saadc::Saadc::new(peripheral, Irqs, config, [channel]);
    saadc.calibrate().await;

    // Safety: only the sampler touches the channel table, from the main task
    let (driver_channels, sampler_channels) =
        unsafe { (SaadcChannels::steal(), SaadcChannels::steal()) };

    VddSampler::new(Analog::new(saadc, driver_channels), sampler_channels, EdgePin0)
}

fn setup_serial(uarte: peripherals::UARTE0, tx: peripherals::P0_06) -> Serial {
    let mut config = uarte::Config::default();
    config.baudrate = SERIAL_BAUDRATE;

    Serial::new(uarte::UarteTx::new(uarte, Irqs, tx, config))
}

fn setup_display(spawner: &Spawner, rows: [AnyPin; 5], columns: [AnyPin; 5]) -> LedMatrix {
    defmt::info!("Spawning LED matrix refresh");

    let rows = rows.map(|pin| Output::new(pin, Level::Low, OutputDrive::Standard));
    let columns = columns.map(|pin| Output::new(pin, Level::High, OutputDrive::Standard));
    spawner.must_spawn(led_matrix::refresh(rows, columns));

    LedMatrix::new()
}

fn setup_log(nvmc: peripherals::NVMC) -> FlashLog<Nvmc<'static>> {
    defmt::info!("Opening data log at {=u32:#x}", LOG_START);
    defmt::unwrap!(FlashLog::open(Nvmc::new(nvmc), LOG_START, LOG_LENGTH))
}

pub async fn board(spawner: &Spawner, p: embassy_nrf::Peripherals) -> (Sampler, Board) {
    let rows = [
        p.P0_21.degrade(),
        p.P0_22.degrade(),
        p.P0_15.degrade(),
        p.P0_24.degrade(),
        p.P0_19.degrade(),
    ];
    let columns = [
        p.P0_28.degrade(),
        p.P0_11.degrade(),
        p.P0_31.degrade(),
        p.P1_05.degrade(),
        p.P0_30.degrade(),
    ];

    let sampler = setup_analog(p.SAADC, p.P0_02).await;

    let board = Peripherals {
        serial: setup_serial(p.UARTE0, p.P0_06),
        display: setup_display(spawner, rows, columns),
        button: ActiveLowButton::new(p.P0_14.degrade()),
        time: EmbassyTime,
        log: setup_log(p.NVMC),
    };

    (sampler, board)
}
