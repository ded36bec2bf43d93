use embassy_nrf::peripherals::UARTE0;
use embassy_nrf::uarte::UarteTx;
use vddlog::board::SerialPort;

/// Transmit half of UARTE0, connected to the interface MCU's USB serial bridge
pub struct Serial {
    tx: UarteTx<'static, UARTE0>,
}

impl Serial {
    pub fn new(tx: UarteTx<'static, UARTE0>) -> Self {
        Self { tx }
    }
}

impl SerialPort for Serial {
    async fn write(&mut self, bytes: &[u8]) {
        if let Err(e) = self.tx.write(bytes).await {
            defmt::warn!("dropped {} serial bytes: {}", bytes.len(), e);
        }
    }
}
