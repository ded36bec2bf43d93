mod common;

use common::*;
use futures::executor::block_on;
use vddlog::{
    board::DataLog,
    datalog::{decode, FlashLog, TimestampFormat},
    display::Image,
    logger, monitor, VddSampler,
};

#[test]
fn stream_live_readings_until_the_button_is_pressed() {
    init_logger();
    let state = saadc(Some(0), 0);
    let mut sampler = VddSampler::new(
        MockDriver(state.clone()),
        MockRegisters(state.clone()),
        SAMPLED_PIN,
    );
    let mut p = peripherals(RowLog::with_capacity(8), Some(4));

    block_on(async {
        sampler.init().await;
        state.borrow_mut().raw.extend([940, 938, 941, 939]);
        monitor::run_until_button(&mut sampler, &mut p).await;
    });

    assert_eq!(
        p.serial.text(),
        "3304 mV\r\n3297 mV\r\n3308 mV\r\n3301 mV\r\n"
    );
    assert_eq!(
        p.display.scrolled,
        vec!["3304 mV", "3297 mV", "3308 mV", "3301 mV"]
    );
    assert!(p.log.rows.is_empty());
    assert_eq!(p.log.cleared, 0);
}

#[test]
fn leave_monitoring_before_the_next_sleep() {
    init_logger();
    let mut source = ScriptedSource::constant(3214);
    let mut p = peripherals(RowLog::with_capacity(8), Some(2));

    block_on(monitor::run_until_button(&mut source, &mut p));

    assert_eq!(p.serial.text(), "3214 mV\r\n3214 mV\r\n");
    assert_eq!(p.button.polls, 2);
    assert_eq!(p.time.sleeps(), 1);
    assert_eq!(source.reads, 2);
}

#[test]
fn check_the_button_only_after_the_animation() {
    init_logger();
    let mut source = ScriptedSource::constant(3000);
    let mut p = peripherals(RowLog::with_capacity(8), Some(1));

    block_on(monitor::run_until_button(&mut source, &mut p));

    // Even an immediate press lets the first reading through
    assert_eq!(p.display.scrolled, vec!["3000 mV"]);
    assert_eq!(p.time.sleeps(), 0);
}

#[test]
fn log_the_truncated_mean_of_each_window() {
    init_logger();
    let readings = std::iter::repeat(1020)
        .take(30)
        .chain(std::iter::repeat(1000).take(30))
        .chain([2000]);
    let mut source = ScriptedSource::new(readings);
    let mut p = peripherals(RowLog::with_capacity(2), None);

    block_on(logger::record(&mut source, &mut p));

    assert_eq!(p.log.values(), vec!["1010", "2000"]);
    assert_eq!(p.log.rows[0].1[0].0, logger::COLUMN);
}

#[test]
fn consume_a_full_window_per_row() {
    init_logger();

    for capacity in 1..=3 {
        let mut source = ScriptedSource::constant(3164);
        let mut p = peripherals(RowLog::with_capacity(capacity), None);

        block_on(logger::record(&mut source, &mut p));

        assert_eq!(p.log.rows.len(), capacity);
        assert_eq!(source.reads, 60 * capacity);
    }
}

#[test]
fn sample_on_a_fixed_cadence() {
    init_logger();
    let mut source = ScriptedSource::constant(3164);
    let mut p = peripherals(RowLog::with_capacity(1), None);

    block_on(logger::record(&mut source, &mut p));

    let deadlines = p.time.deadlines.borrow();
    assert_eq!(deadlines.len(), 60);
    assert!(deadlines.windows(2).all(|pair| pair[1] - pair[0] == 1_000));
    assert_eq!(p.log.rows[0].0, 59_000);
}

#[test]
fn prepare_the_log_and_show_the_cross_once_full() {
    init_logger();
    let mut source = ScriptedSource::constant(3164);
    let mut log = RowLog::with_capacity(1);
    log.rows.push((0, vec![("stale".into(), "row".into())]));
    let mut p = peripherals(log, None);

    block_on(logger::record(&mut source, &mut p));

    assert_eq!(p.log.cleared, 1);
    assert!(p.log.visible);
    assert!(!p.log.mirroring);
    assert_eq!(p.log.timestamp, Some(TimestampFormat::Seconds));
    assert_eq!(p.log.values(), vec!["3164"]);

    assert!(p.serial.bytes.is_empty());
    assert_eq!(p.display.shown, vec![Image::CROSS]);
    assert_eq!(p.display.current, Image::CROSS);
}

#[test]
fn give_up_when_the_log_cannot_be_prepared() {
    init_logger();
    let formatted = FlashLog::open(MemFlash::<192>::new(), 0, 192).unwrap();
    let mut flash = formatted.release();
    flash.fail_writes = true;

    let mut source = ScriptedSource::constant(3164);
    let mut p = peripherals(FlashLog::open(flash, 0, 192).unwrap(), None);

    block_on(logger::record(&mut source, &mut p));

    assert_eq!(source.reads, 0);
    assert_eq!(p.display.current, Image::CROSS);
}

#[test]
fn monitor_then_fill_the_flash_log() {
    init_logger();
    let state = saadc(Some(0), 900);
    let mut sampler = VddSampler::new(
        MockDriver(state.clone()),
        MockRegisters(state.clone()),
        SAMPLED_PIN,
    );
    let log = FlashLog::open(MemFlash::<192>::new(), 0, 192).unwrap();
    let mut p = peripherals(log, Some(2));

    block_on(async {
        sampler.init().await;
        monitor::run_until_button(&mut sampler, &mut p).await;
        logger::record(&mut sampler, &mut p).await;
    });

    assert_eq!(p.serial.text(), "3164 mV\r\n3164 mV\r\n");
    assert!(p.log.is_full());
    assert_eq!(p.display.current, Image::CROSS);

    // Discovery, two live readings and three full windows
    assert_eq!(state.borrow().conversions.len(), 3 + 2 + 180);

    let flash = p.log.release();
    let (header, records) = decode(&flash.data, MEM_PAGE_SIZE).unwrap();
    assert!(header.visible);
    assert_eq!(header.timestamp, TimestampFormat::Seconds);
    assert_eq!(
        records.collect::<Result<Vec<_>, _>>().unwrap(),
        vec!["Time (seconds),mV", "60,3164", "120,3164", "180,3164"]
    );
}
