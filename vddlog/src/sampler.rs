//! Supply voltage measurement through a borrowed SAADC channel.
//!
//! The analog driver only knows how to convert external pins and keeps its
//! pin-to-slot mapping private. To measure VDD we let the driver set up a
//! channel for a known pin, find that channel by scanning the `PSELP`
//! registers, and then redirect it to the internal VDD rail right before
//! each conversion the driver performs for that pin.
#![allow(async_fn_in_trait)]

use crate::board::AnalogDriver;
use crate::constants::{GAIN_DIVISOR, REFERENCE_MV, RESOLUTION_BITS};
use crate::saadc::{ChannelConfig, ChannelRegisters, PositiveInput, Slot};

/// Anything that can produce a supply voltage reading in millivolts
pub trait VddSource {
    async fn read_millivolts(&mut self) -> u32;
}

/// Converts a raw SAADC count taken with [`ChannelConfig::VDD_MEASUREMENT`]
/// into millivolts, truncating towards zero.
pub const fn raw_to_millivolts(raw: u16) -> u32 {
    REFERENCE_MV * GAIN_DIVISOR * raw as u32 / (1 << RESOLUTION_BITS)
}

/// Measures VDD by hijacking the SAADC slot the driver allocated for `pin`.
///
/// The slot is reprogrammed on every reading and nothing is restored
/// afterwards. No other analog read may be issued on any pin between the
/// driver's channel activation and the conversion of a reading; with a
/// cooperative executor this holds as long as the sampler is the only
/// analog consumer.
pub struct VddSampler<A: AnalogDriver, R: ChannelRegisters> {
    driver: A,
    registers: R,
    pin: A::Pin,
    expected_input: PositiveInput,
    slot: Option<Slot>,
}

impl<A: AnalogDriver, R: ChannelRegisters> VddSampler<A, R> {
    /// Creates an unbound sampler for a pin the driver maps to `AIN0`
    pub fn new(driver: A, registers: R, pin: A::Pin) -> Self {
        Self::with_input(driver, registers, pin, PositiveInput::Analog(0))
    }

    /// Creates an unbound sampler for a pin the driver maps to `expected_input`
    pub fn with_input(driver: A, registers: R, pin: A::Pin, expected_input: PositiveInput) -> Self {
        Self {
            driver,
            registers,
            pin,
            expected_input,
            slot: None,
        }
    }

    /// Slot the sampler is bound to, if discovery succeeded
    pub fn slot(&self) -> Option<Slot> {
        self.slot
    }

    /// Lets the driver allocate and configure a slot for the pin, then binds
    /// to the first slot whose positive input is that pin.
    pub async fn init(&mut self) {
        // Allocation and configuration are separate paths in the driver,
        // both have to run before the slot table reflects the pin.
        let _ = self.driver.read_analog(self.pin).await;
        self.driver.activate_channel(self.pin);
        let _ = self.driver.read_analog(self.pin).await;

        let expected = self.expected_input.bits();
        self.slot = Slot::all().find(|slot| self.registers.pselp(*slot) == expected);

        match self.slot {
            Some(slot) => info!("vdd sampler bound to saadc slot {}", slot.index()),
            None => warn!("no saadc slot selects the sampled pin, vdd readings will be 0"),
        }

        // The first conversion after reconfiguring the channel reads off
        let _ = self.read_millivolts().await;
    }

    /// Converts VDD once, returning 0 while unbound
    pub async fn read_millivolts(&mut self) -> u32 {
        let Some(slot) = self.slot else {
            return 0;
        };

        // Restore the driver's view of the slot before overwriting it, another
        // read on this pin may have reconfigured it since our last conversion.
        self.driver.activate_channel(self.pin);

        self.registers
            .write_config(slot, ChannelConfig::VDD_MEASUREMENT.bits());
        self.registers.write_pselp(slot, PositiveInput::Vdd.bits());

        let raw = self.driver.read_analog(self.pin).await;
        let millivolts = raw_to_millivolts(raw);
        trace!("vdd raw={} mv={}", raw, millivolts);

        millivolts
    }
}

impl<A: AnalogDriver, R: ChannelRegisters> VddSource for VddSampler<A, R> {
    async fn read_millivolts(&mut self) -> u32 {
        VddSampler::read_millivolts(self).await
    }
}
