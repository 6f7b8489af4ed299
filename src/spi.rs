//! SPI master on the programming header (MOSI = pin4, MISO = pin1,
//! SCK = pin2, CS = pin3).

use crate::consts::{packed, version, Function, MAX_RESPONSE_LEN};
use crate::device::LittleWire;
use crate::error::Result;
use crate::transport::Transport;
use log::debug;

/// Borrowed SPI session obtained from [`LittleWire::spi`].
#[derive(Debug)]
pub struct Spi<'a, T: Transport> {
    wire: &'a mut LittleWire<T>,
}

impl<T: Transport> LittleWire<T> {
    /// Configures the SPI pins and opens the SPI sub-protocol. Needs
    /// firmware 1.1.
    pub fn spi(&mut self) -> Result<Spi<'_, T>> {
        self.require_firmware("SPI", version::SPI)?;
        debug!("Setting up SPI");
        self.control_out(Function::SetupSpi, 0, 0)?;
        Ok(Spi { wire: self })
    }
}

impl<T: Transport> Spi<'_, T> {
    /// Full-duplex exchange. Returns one received byte per byte sent.
    ///
    /// The firmware moves four bytes per request. With `auto_chip_select`
    /// the firmware asserts CS around each request, so a message longer than
    /// four bytes is not framed by a single CS pulse.
    pub fn send(&mut self, bytes: &[u8], auto_chip_select: bool) -> Result<Vec<u8>> {
        debug!(
            "SPI send {} bytes (auto_cs={})",
            bytes.len(),
            auto_chip_select
        );
        let mut received = Vec::with_capacity(bytes.len());
        for chunk in bytes.chunks(packed::MAX_PAYLOAD) {
            let byte = |i: usize| u16::from(chunk.get(i).copied().unwrap_or(0));
            let mut request = packed::SPI_SEND | chunk.len() as u8;
            if auto_chip_select {
                request |= packed::FLAG_BIT;
            }
            self.wire.request_in(
                request,
                byte(1) << 8 | byte(0),
                byte(3) << 8 | byte(2),
                MAX_RESPONSE_LEN,
            )?;
            let mut reply = self.wire.read_buffer()?;
            reply.resize(chunk.len(), 0);
            received.extend_from_slice(&reply);
        }
        Ok(received)
    }

    /// Sets the delay between SPI clock edges, in firmware loop units.
    /// Zero is the fastest clock.
    pub fn set_delay(&mut self, delay: u8) -> Result<()> {
        debug!("SPI delay = {}", delay);
        self.wire
            .control_out(Function::SpiUpdateDelay, delay.into(), 0)
    }

    /// Firmware SPI debug status byte.
    pub fn debug_status(&mut self) -> Result<i8> {
        self.wire
            .control_in(Function::DebugSpi, 0, 0, MAX_RESPONSE_LEN)?;
        let buffer = self.wire.read_buffer()?;
        Ok(buffer.first().map_or(0, |&b| b as i8))
    }
}
