use core::ptr::{read_volatile, write_volatile};
use vddlog::saadc::{registers, ChannelRegisters, Slot};

/// Volatile access to the SAADC channel table behind the driver's back
pub struct SaadcChannels {
    _private: (),
}

impl SaadcChannels {
    /// # Safety
    ///
    /// The SAADC driver still owns the peripheral. Callers must only write
    /// while no conversion is running, which holds as long as every access
    /// happens from the task that also awaits the driver's samples.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl ChannelRegisters for SaadcChannels {
    fn pselp(&self, slot: Slot) -> u32 {
        unsafe { read_volatile(registers::pselp(slot.index()) as *const u32) }
    }

    fn write_pselp(&mut self, slot: Slot, bits: u32) {
        unsafe { write_volatile(registers::pselp(slot.index()) as *mut u32, bits) }
    }

    fn write_config(&mut self, slot: Slot, bits: u32) {
        unsafe { write_volatile(registers::config(slot.index()) as *mut u32, bits) }
    }
}
