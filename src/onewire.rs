//! Dallas/Maxim 1-Wire master on pin2.
//!
//! The firmware bit-bangs each slot with interrupts off, so byte-level
//! requests are followed by a short hold-off before the next request.

use crate::consts::{onewire, version, Function};
use crate::device::LittleWire;
use crate::error::{Error, Result};
use crate::transport::Transport;
use log::{debug, trace};

/// ROM command that starts the device search.
const SEARCH_ROM: u8 = 0xF0;

/// Dallas CRC-8 (polynomial x^8 + x^5 + x^4 + 1) as used by 1-Wire ROM codes.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}

/// Borrowed 1-Wire session obtained from [`LittleWire::onewire`].
#[derive(Debug)]
pub struct OneWire<'a, T: Transport> {
    wire: &'a mut LittleWire<T>,
}

impl<T: Transport> LittleWire<T> {
    /// Opens the 1-Wire sub-protocol. Needs firmware 1.2.
    pub fn onewire(&mut self) -> Result<OneWire<'_, T>> {
        self.require_firmware("1-Wire", version::ONEWIRE)?;
        Ok(OneWire { wire: self })
    }
}

impl<T: Transport> OneWire<'_, T> {
    fn first_buffer_byte(&mut self) -> Result<u8> {
        let buffer = self.wire.read_buffer()?;
        buffer.first().copied().ok_or(Error::ShortResponse {
            expected: 1,
            actual: 0,
        })
    }

    /// Sends a reset pulse. Returns `true` if any device answered with a
    /// presence pulse.
    pub fn reset_pulse(&mut self) -> Result<bool> {
        self.wire.control_out(Function::OnewireResetPulse, 0, 0)?;
        self.wire.transport.hold_off(onewire::SETTLE);
        let presence = self.first_buffer_byte()? != 0;
        debug!("1-Wire reset, presence={}", presence);
        Ok(presence)
    }

    /// Writes one byte, LSB first.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        trace!("1-Wire write 0x{:02X}", byte);
        self.wire
            .control_out(Function::OnewireSendByte, byte.into(), 0)?;
        self.wire.transport.hold_off(onewire::SETTLE);
        Ok(())
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.wire.control_out(Function::OnewireReadByte, 0, 0)?;
        self.wire.transport.hold_off(onewire::SETTLE);
        let byte = self.first_buffer_byte()?;
        trace!("1-Wire read 0x{:02X}", byte);
        Ok(byte)
    }

    /// Writes a single time slot.
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.wire
            .control_out(Function::OnewireWriteBit, u16::from(bit), 0)
    }

    /// Reads a single time slot.
    pub fn read_bit(&mut self) -> Result<bool> {
        self.wire.control_out(Function::OnewireReadBit, 0, 0)?;
        Ok(self.first_buffer_byte()? != 0)
    }

    /// Enumerates the 64-bit ROM codes of every device on the bus.
    ///
    /// Codes failing the CRC are skipped. Returns an empty list if nothing
    /// answers the reset pulse.
    pub fn search(&mut self) -> Result<Vec<[u8; 8]>> {
        let mut found = Vec::new();
        let mut rom = [0u8; 8];
        let mut last_discrepancy: Option<usize> = None;

        loop {
            if !self.reset_pulse()? {
                break;
            }
            self.write_byte(SEARCH_ROM)?;

            let mut discrepancy: Option<usize> = None;
            let mut complete = true;
            for bit_index in 0..64 {
                let byte = bit_index / 8;
                let mask = 1u8 << (bit_index % 8);
                let id_bit = self.read_bit()?;
                let complement = self.read_bit()?;

                let direction = match (id_bit, complement) {
                    (true, true) => {
                        // No device is participating any more.
                        complete = false;
                        break;
                    }
                    (a, b) if a != b => a,
                    _ => {
                        let take_one = match last_discrepancy {
                            Some(last) if bit_index < last => rom[byte] & mask != 0,
                            Some(last) => bit_index == last,
                            None => false,
                        };
                        if !take_one {
                            discrepancy = Some(bit_index);
                        }
                        take_one
                    }
                };
                if direction {
                    rom[byte] |= mask;
                } else {
                    rom[byte] &= !mask;
                }
                self.write_bit(direction)?;
            }

            if !complete {
                break;
            }
            if crc8(&rom[..7]) == rom[7] {
                debug!("1-Wire device {:02X?}", rom);
                found.push(rom);
            } else {
                debug!("1-Wire ROM {:02X?} failed CRC, skipping", rom);
            }
            match discrepancy {
                Some(d) => last_discrepancy = Some(d),
                None => break,
            }
        }
        Ok(found)
    }
}
