#![allow(dead_code)]

use core::cell::{Cell, RefCell};
use core::future::{ready, Ready};
use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};
use std::collections::VecDeque;
use std::rc::Rc;
use vddlog::{
    board::{AnalogDriver, Button, DataLog, Display, Peripherals, SerialPort},
    datalog::TimestampFormat,
    display::Image,
    saadc::{ChannelConfig, ChannelRegisters, PositiveInput, Slot},
    time::TimeDriver,
    VddSource,
};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// --- SAADC ---

pub const SAMPLED_PIN: u8 = 2;

/// Register file and driver bookkeeping of the emulated SAADC
#[derive(Debug, Default)]
pub struct SaadcState {
    pub pselp: [u32; 8],
    pub config: [u32; 8],
    /// Slot the driver hands out on its first read, `None` to never allocate
    pub allocates: Option<usize>,
    pub allocated: bool,

    pub raw: VecDeque<u16>,
    pub default_raw: u16,

    /// `(PSELP, CONFIG)` of the allocated slot at every conversion
    pub conversions: Vec<(u32, u32)>,
    pub pselp_writes: Vec<(usize, u32)>,
    pub config_writes: Vec<(usize, u32)>,
}

impl SaadcState {
    fn write_canonical(&mut self, slot: usize) {
        self.pselp[slot] = PositiveInput::Analog(0).bits();
        self.config[slot] = ChannelConfig::DRIVER_DEFAULT.bits();
    }

    pub fn register_writes(&self) -> usize {
        self.pselp_writes.len() + self.config_writes.len()
    }
}

pub type SharedSaadc = Rc<RefCell<SaadcState>>;

pub fn saadc(allocates: Option<usize>, default_raw: u16) -> SharedSaadc {
    Rc::new(RefCell::new(SaadcState {
        allocates,
        default_raw,
        ..Default::default()
    }))
}

/// Driver that allocates its slot lazily on the first conversion
pub struct MockDriver(pub SharedSaadc);

impl AnalogDriver for MockDriver {
    type Pin = u8;

    fn activate_channel(&mut self, _pin: u8) {
        let mut state = self.0.borrow_mut();
        if let (true, Some(slot)) = (state.allocated, state.allocates) {
            state.write_canonical(slot);
        }
    }

    async fn read_analog(&mut self, _pin: u8) -> u16 {
        let mut state = self.0.borrow_mut();

        if let Some(slot) = state.allocates {
            if !state.allocated {
                state.allocated = true;
                state.write_canonical(slot);
            }

            let snapshot = (state.pselp[slot], state.config[slot]);
            state.conversions.push(snapshot);
        }

        let fallback = state.default_raw;
        state.raw.pop_front().unwrap_or(fallback)
    }
}

pub struct MockRegisters(pub SharedSaadc);

impl ChannelRegisters for MockRegisters {
    fn pselp(&self, slot: Slot) -> u32 {
        self.0.borrow().pselp[slot.index()]
    }

    fn write_pselp(&mut self, slot: Slot, value: u32) {
        let mut state = self.0.borrow_mut();
        state.pselp[slot.index()] = value;
        state.pselp_writes.push((slot.index(), value));
    }

    fn write_config(&mut self, slot: Slot, value: u32) {
        let mut state = self.0.borrow_mut();
        state.config[slot.index()] = value;
        state.config_writes.push((slot.index(), value));
    }
}

// --- Board ---

#[derive(Default)]
pub struct RecordingSerial {
    pub bytes: Vec<u8>,
}

impl RecordingSerial {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl SerialPort for RecordingSerial {
    async fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub scrolled: Vec<String>,
    pub shown: Vec<Image>,
    pub current: Image,
}

impl Display for RecordingDisplay {
    async fn scroll(&mut self, text: &str) {
        self.scrolled.push(text.to_owned());
        self.current = Image::BLANK;
    }

    fn show(&mut self, image: &Image) {
        self.shown.push(*image);
        self.current = *image;
    }

    fn set_pixel(&mut self, x: usize, y: usize, brightness: u8) {
        self.current.set_pixel(x, y, brightness);
    }
}

/// Reports a press on the n-th poll only
#[derive(Default)]
pub struct ScriptedButton {
    pub polls: usize,
    pub press_on: Option<usize>,
}

impl Button for ScriptedButton {
    fn is_pressed(&mut self) -> bool {
        self.polls += 1;
        self.press_on == Some(self.polls)
    }
}

/// Clock that jumps straight to every deadline it is asked to wait for
#[derive(Default)]
pub struct MockTime {
    now: Cell<u64>,
    pub deadlines: RefCell<Vec<u64>>,
}

impl MockTime {
    pub fn sleeps(&self) -> usize {
        self.deadlines.borrow().len()
    }
}

impl TimeDriver for MockTime {
    type TimerFut = Ready<()>;

    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn wait_until(&self, deadline_ms: u64) -> Self::TimerFut {
        self.deadlines.borrow_mut().push(deadline_ms);
        if deadline_ms > self.now.get() {
            self.now.set(deadline_ms);
        }
        ready(())
    }
}

/// In-memory log with room for a fixed number of rows
pub struct RowLog {
    pub capacity: usize,
    pub rows: Vec<(u64, Vec<(String, String)>)>,
    pub cleared: usize,
    pub visible: bool,
    pub mirroring: bool,
    pub timestamp: Option<TimestampFormat>,
    last_row: Option<String>,
}

impl RowLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            rows: Vec::new(),
            cleared: 0,
            visible: false,
            mirroring: true,
            timestamp: None,
            last_row: None,
        }
    }

    pub fn values(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|(_, columns)| columns[0].1.clone())
            .collect()
    }
}

impl DataLog for RowLog {
    type Error = ();

    fn set_serial_mirroring(&mut self, enabled: bool) {
        self.mirroring = enabled;
    }

    fn set_timestamp(&mut self, format: TimestampFormat) -> Result<(), ()> {
        self.timestamp = Some(format);
        Ok(())
    }

    fn set_visible(&mut self, visible: bool) -> Result<(), ()> {
        self.visible = visible;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), ()> {
        self.cleared += 1;
        self.rows.clear();
        Ok(())
    }

    fn log_row(&mut self, timestamp_ms: u64, columns: &[(&str, &str)]) -> Result<(), ()> {
        if self.is_full() {
            return Err(());
        }

        let columns: Vec<(String, String)> = columns
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        self.last_row = Some(columns[0].1.clone());
        self.rows.push((timestamp_ms, columns));

        Ok(())
    }

    fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    fn mirrored_row(&self) -> Option<&str> {
        self.last_row.as_deref().filter(|_| self.mirroring)
    }
}

pub type MockPeripherals<L> =
    Peripherals<RecordingSerial, RecordingDisplay, ScriptedButton, MockTime, L>;

pub fn peripherals<L>(log: L, press_on: Option<usize>) -> MockPeripherals<L> {
    Peripherals {
        serial: RecordingSerial::default(),
        display: RecordingDisplay::default(),
        button: ScriptedButton {
            polls: 0,
            press_on,
        },
        time: MockTime::default(),
        log,
    }
}

// --- Sources ---

/// Replays a fixed sequence of readings, repeating the last one forever
pub struct ScriptedSource {
    readings: VecDeque<u32>,
    last: u32,
    pub reads: usize,
}

impl ScriptedSource {
    pub fn new(readings: impl IntoIterator<Item = u32>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
            last: 0,
            reads: 0,
        }
    }

    pub fn constant(millivolts: u32) -> Self {
        Self::new([millivolts])
    }
}

impl VddSource for ScriptedSource {
    async fn read_millivolts(&mut self) -> u32 {
        self.reads += 1;
        if let Some(next) = self.readings.pop_front() {
            self.last = next;
        }
        self.last
    }
}

// --- Flash ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemFlashError {
    OutOfBounds,
    NotAligned,
    NotErased,
    Injected,
}

impl NorFlashError for MemFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            MemFlashError::OutOfBounds => NorFlashErrorKind::OutOfBounds,
            MemFlashError::NotAligned => NorFlashErrorKind::NotAligned,
            _ => NorFlashErrorKind::Other,
        }
    }
}

pub const MEM_PAGE_SIZE: usize = 64;

/// NOR flash in RAM with 64 byte pages that refuses to program unerased bits
pub struct MemFlash<const SIZE: usize> {
    pub data: Vec<u8>,
    pub fail_writes: bool,
    pub erases: usize,
}

impl<const SIZE: usize> MemFlash<SIZE> {
    pub fn new() -> Self {
        Self {
            data: vec![0xFF; SIZE],
            fail_writes: false,
            erases: 0,
        }
    }

    /// Flash as it leaves the factory or after foreign firmware used it
    pub fn filled(byte: u8) -> Self {
        Self {
            data: vec![byte; SIZE],
            ..Self::new()
        }
    }

    fn check(offset: u32, length: usize, align: usize) -> Result<(), MemFlashError> {
        let offset = offset as usize;
        if offset + length > SIZE {
            Err(MemFlashError::OutOfBounds)
        } else if offset % align != 0 || length % align != 0 {
            Err(MemFlashError::NotAligned)
        } else {
            Ok(())
        }
    }
}

impl<const SIZE: usize> ErrorType for MemFlash<SIZE> {
    type Error = MemFlashError;
}

impl<const SIZE: usize> ReadNorFlash for MemFlash<SIZE> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        Self::check(offset, bytes.len(), Self::READ_SIZE)?;
        let offset = offset as usize;
        bytes.copy_from_slice(&self.data[offset..offset + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        SIZE
    }
}

impl<const SIZE: usize> NorFlash for MemFlash<SIZE> {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = MEM_PAGE_SIZE;

    fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        if to < from {
            return Err(MemFlashError::OutOfBounds);
        }
        Self::check(from, (to - from) as usize, Self::ERASE_SIZE)?;

        self.data[from as usize..to as usize].fill(0xFF);
        self.erases += 1;
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MemFlashError::Injected);
        }
        Self::check(offset, bytes.len(), Self::WRITE_SIZE)?;

        let target = &mut self.data[offset as usize..offset as usize + bytes.len()];
        if target.iter().zip(bytes).any(|(old, new)| old & new != *new) {
            return Err(MemFlashError::NotErased);
        }
        target.copy_from_slice(bytes);
        Ok(())
    }
}
