use super::registers::SaadcChannels;
use embassy_nrf::saadc::Saadc;
use vddlog::board::AnalogDriver;
use vddlog::saadc::{ChannelConfig, ChannelRegisters, PositiveInput, Slot};

/// Edge connector pin P0, wired to `AIN0`
#[derive(Clone, Copy, defmt::Format)]
pub struct EdgePin0;

/// embassy's SAADC driver configured with a single channel for [`EdgePin0`].
///
/// The driver writes its channel table once at construction, so
/// re-activating the channel rewrites slot 0 with the same words.
pub struct Analog {
    saadc: Saadc<'static, 1>,
    channels: SaadcChannels,
}

impl Analog {
    pub fn new(saadc: Saadc<'static, 1>, channels: SaadcChannels) -> Self {
        Self { saadc, channels }
    }
}

impl AnalogDriver for Analog {
    type Pin = EdgePin0;

    fn activate_channel(&mut self, _pin: EdgePin0) {
        if let Some(slot) = Slot::new(0) {
            self.channels
                .write_config(slot, ChannelConfig::DRIVER_DEFAULT.bits());
            self.channels
                .write_pselp(slot, PositiveInput::Analog(0).bits());
        }
    }

    async fn read_analog(&mut self, _pin: EdgePin0) -> u16 {
        let mut buf = [0i16; 1];
        self.saadc.sample(&mut buf).await;

        // Single ended conversions may dip slightly below zero
        buf[0].max(0) as u16
    }
}
