//! Register contract of the nRF52 SAADC channel table.
//!
//! Only the two words per channel slot the sampler rewrites are modelled:
//! `CH[n].CONFIG` and `CH[n].PSELP`. Field offsets and values follow the
//! nRF52833 product specification (SAADC chapter) and are kept independent
//! of any PAC so the contract with the silicon stays visible in one place.

use crate::constants::CHANNEL_COUNT;

/// Memory map of the SAADC channel table
pub mod registers {
    pub const SAADC_BASE: usize = 0x4000_7000;
    pub const CH_BASE: usize = 0x510;
    pub const CH_STRIDE: usize = 0x10;

    pub const PSELP_OFFSET: usize = 0x0;
    pub const PSELN_OFFSET: usize = 0x4;
    pub const CONFIG_OFFSET: usize = 0x8;

    /// Absolute address of the `CH[slot].PSELP` register
    pub const fn pselp(slot: usize) -> usize {
        SAADC_BASE + CH_BASE + slot * CH_STRIDE + PSELP_OFFSET
    }

    /// Absolute address of the `CH[slot].CONFIG` register
    pub const fn config(slot: usize) -> usize {
        SAADC_BASE + CH_BASE + slot * CH_STRIDE + CONFIG_OFFSET
    }
}

const RESP_POS: u32 = 0;
const RESN_POS: u32 = 4;
const GAIN_POS: u32 = 8;
const REFSEL_POS: u32 = 12;
const TACQ_POS: u32 = 16;
const MODE_POS: u32 = 20;
const BURST_POS: u32 = 24;

const PSELP_MASK: u32 = 0x1F;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Resistor {
    Bypass = 0,
    Pulldown = 1,
    Pullup = 2,
    HalfVdd = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Gain {
    OneSixth = 0,
    OneFifth = 1,
    OneQuarter = 2,
    OneThird = 3,
    OneHalf = 4,
    One = 5,
    Two = 6,
    Four = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Reference {
    /// Internal 0.6 V bandgap
    Internal = 0,
    /// VDD / 4
    QuarterVdd = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum AcquisitionTime {
    Us3 = 0,
    Us5 = 1,
    Us10 = 2,
    Us15 = 3,
    Us20 = 4,
    Us40 = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum Mode {
    SingleEnded = 0,
    Differential = 1,
}

/// Typed view of a `CH[n].CONFIG` word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub resp: Resistor,
    pub resn: Resistor,
    pub gain: Gain,
    pub reference: Reference,
    pub acquisition_time: AcquisitionTime,
    pub mode: Mode,
    pub burst: bool,
}

impl ChannelConfig {
    /// Composition written before every VDD conversion.
    ///
    /// Gain 1/6 against the 0.6 V reference gives a 3.6 V full scale, above a
    /// fresh cell's VDD and below the absolute maximum rating.
    pub const VDD_MEASUREMENT: Self = Self {
        resp: Resistor::Bypass,
        resn: Resistor::Bypass,
        gain: Gain::OneSixth,
        reference: Reference::Internal,
        acquisition_time: AcquisitionTime::Us3,
        mode: Mode::SingleEnded,
        burst: false,
    };

    /// What the analog driver writes for a single-ended pin channel
    pub const DRIVER_DEFAULT: Self = Self {
        acquisition_time: AcquisitionTime::Us10,
        ..Self::VDD_MEASUREMENT
    };

    pub const fn bits(&self) -> u32 {
        ((self.resp as u32) << RESP_POS)
            | ((self.resn as u32) << RESN_POS)
            | ((self.gain as u32) << GAIN_POS)
            | ((self.reference as u32) << REFSEL_POS)
            | ((self.acquisition_time as u32) << TACQ_POS)
            | ((self.mode as u32) << MODE_POS)
            | ((self.burst as u32) << BURST_POS)
    }
}

/// Source selected by a `CH[n].PSELP` word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PositiveInput {
    NotConnected,
    /// External analog input line `AIN0` to `AIN7`
    Analog(u8),
    Vdd,
    VddhDiv5,
}

impl PositiveInput {
    pub const fn bits(&self) -> u32 {
        match self {
            PositiveInput::NotConnected => 0,
            PositiveInput::Analog(line) => (*line as u32 & 0x7) + 1,
            PositiveInput::Vdd => 9,
            PositiveInput::VddhDiv5 => 0x0D,
        }
    }

    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits & PSELP_MASK {
            0 => Some(PositiveInput::NotConnected),
            line @ 1..=8 => Some(PositiveInput::Analog(line as u8 - 1)),
            9 => Some(PositiveInput::Vdd),
            0x0D => Some(PositiveInput::VddhDiv5),
            _ => None,
        }
    }
}

/// Index into the SAADC channel table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot(usize);

impl Slot {
    pub const fn new(index: usize) -> Option<Self> {
        if index < CHANNEL_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn index(&self) -> usize {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Slot> {
        (0..CHANNEL_COUNT).map(Slot)
    }
}

/// Raw access to the per-slot words of the channel table.
///
/// Implementations write straight to the peripheral, bypassing whatever
/// driver owns the SAADC.
pub trait ChannelRegisters {
    fn pselp(&self, slot: Slot) -> u32;
    fn write_pselp(&mut self, slot: Slot, bits: u32);
    fn write_config(&mut self, slot: Slot, bits: u32);
}
