//! I2C master on the LittleWire's USI pins (SDA = pin1, SCL = pin2).
//!
//! Targets the firmware 1.2+ protocol: the direction bit is 0 for write and
//! 1 for read, and a read carries its NACK flag in wIndex. A transaction is
//! `start`, then any number of `write`/`read` calls, the last of which sends
//! the stop condition. Nothing is remembered between calls; a failed
//! multi-chunk write leaves the bus mid-transaction and needs a new `start`.

use crate::consts::{i2c, packed, version, Function, MAX_RESPONSE_LEN};
use crate::device::LittleWire;
use crate::error::{Error, Result};
use crate::transport::Transport;
use log::{debug, trace, warn};
use std::fmt;
use std::str::FromStr;

/// Transfer direction encoded in the start condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cDirection {
    /// Master transmits to the slave.
    Write,
    /// Master receives from the slave.
    Read,
}

impl I2cDirection {
    fn bit(self) -> u16 {
        match self {
            I2cDirection::Write => i2c::DIRECTION_WRITE,
            I2cDirection::Read => i2c::DIRECTION_READ,
        }
    }
}

impl FromStr for I2cDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "write" | "out" | "output" | "send" => Ok(I2cDirection::Write),
            "read" | "in" | "input" | "receive" => Ok(I2cDirection::Read),
            _ => Err(Error::InvalidArgument(format!(
                "Unknown I2C direction '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for I2cDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            I2cDirection::Write => f.write_str("write"),
            I2cDirection::Read => f.write_str("read"),
        }
    }
}

fn check_address(address: u8) -> Result<()> {
    if address > i2c::MAX_7BIT_ADDRESS {
        Err(Error::I2cAddressOutOfRange(address))
    } else {
        Ok(())
    }
}

/// Encodes one write chunk of at most four bytes as `(bRequest, wValue, wIndex)`.
fn encode_write_chunk(chunk: &[u8], stop: bool) -> (u8, u16, u16) {
    let byte = |i: usize| u16::from(chunk.get(i).copied().unwrap_or(0));
    let mut request = packed::I2C_WRITE | chunk.len() as u8;
    if stop {
        request |= packed::FLAG_BIT;
    }
    (request, byte(1) << 8 | byte(0), byte(3) << 8 | byte(2))
}

/// Borrowed I2C session obtained from [`LittleWire::i2c`].
#[derive(Debug)]
pub struct I2c<'a, T: Transport> {
    wire: &'a mut LittleWire<T>,
}

impl<T: Transport> LittleWire<T> {
    /// Opens the I2C sub-protocol. Needs firmware 1.2.
    ///
    /// The bus is initialised once per session; later calls reuse it.
    pub fn i2c(&mut self) -> Result<I2c<'_, T>> {
        self.require_firmware("I2C", version::I2C)?;
        if !self.i2c_initialized {
            if self.version()?.code() == version::I2C_DELAY_BUGGY {
                warn!("I2C delay support is buggy in firmware 1.2, update to at least 1.3");
            }
            debug!("Initialising I2C");
            self.control_in(Function::I2cInit, 0, 0, MAX_RESPONSE_LEN)?;
            self.i2c_initialized = true;
        }
        Ok(I2c { wire: self })
    }
}

impl<T: Transport> I2c<'_, T> {
    /// Sends a start condition and the 7-bit `address`.
    ///
    /// Returns `true` if a device acknowledged.
    pub fn start(&mut self, address: u8, direction: I2cDirection) -> Result<bool> {
        check_address(address)?;
        let config = u16::from(address) << 1 | direction.bit();
        self.wire
            .control_in(Function::I2cBegin, config, 0, MAX_RESPONSE_LEN)?;
        let status = self.wire.read_buffer()?;
        let responded = match status.first() {
            Some(&byte) => byte == 0,
            None => {
                return Err(Error::ShortResponse {
                    expected: 1,
                    actual: 0,
                })
            }
        };
        trace!(
            "I2C start 0x{:02X} {} -> {}",
            address,
            direction,
            if responded { "ACK" } else { "NACK" }
        );
        Ok(responded)
    }

    /// Writes `bytes` to the addressed device, four per request. With
    /// `send_stop` the stop condition follows the last byte.
    ///
    /// An empty buffer with `send_stop` sends only the stop condition.
    pub fn write(&mut self, bytes: &[u8], send_stop: bool) -> Result<()> {
        debug!("I2C write {} bytes (stop={})", bytes.len(), send_stop);
        if bytes.is_empty() {
            if send_stop {
                let (request, value, index) = encode_write_chunk(&[], true);
                self.wire
                    .request_in(request, value, index, MAX_RESPONSE_LEN)?;
            }
            return Ok(());
        }
        let chunk_count = bytes.len().div_ceil(packed::MAX_PAYLOAD);
        for (i, chunk) in bytes.chunks(packed::MAX_PAYLOAD).enumerate() {
            let stop = send_stop && i == chunk_count - 1;
            let (request, value, index) = encode_write_chunk(chunk, stop);
            self.wire
                .request_in(request, value, index, MAX_RESPONSE_LEN)?;
        }
        Ok(())
    }

    /// Reads up to eight bytes from the addressed device.
    ///
    /// `nack_last` NACKs the final byte, which most slaves expect before a
    /// stop condition.
    pub fn read(&mut self, length: usize, send_stop: bool, nack_last: bool) -> Result<Vec<u8>> {
        if length > MAX_RESPONSE_LEN {
            return Err(Error::OperationTooLarge {
                max: MAX_RESPONSE_LEN,
                actual: length,
            });
        }
        debug!(
            "I2C read {} bytes (stop={}, nack_last={})",
            length, send_stop, nack_last
        );
        let value = (length as u16) << 8 | u16::from(send_stop);
        self.wire
            .control_in(Function::I2cRead, value, u16::from(nack_last), MAX_RESPONSE_LEN)?;
        let mut data = self.wire.read_buffer()?;
        data.truncate(length);
        Ok(data)
    }

    /// Ends the transaction with a bare stop condition.
    pub fn stop(&mut self) -> Result<()> {
        self.write(&[], true)
    }

    /// Starts a write to `address` and sends `bytes` followed by a stop.
    pub fn transmit(&mut self, address: u8, bytes: &[u8]) -> Result<()> {
        if !self.start(address, I2cDirection::Write)? {
            return Err(Error::DeviceUnresponsive { address });
        }
        self.write(bytes, true)
    }

    /// Starts a read from `address` and returns `length` bytes.
    pub fn request(&mut self, address: u8, length: usize) -> Result<Vec<u8>> {
        if length > MAX_RESPONSE_LEN {
            return Err(Error::OperationTooLarge {
                max: MAX_RESPONSE_LEN,
                actual: length,
            });
        }
        if !self.start(address, I2cDirection::Read)? {
            return Err(Error::DeviceUnresponsive { address });
        }
        self.read(length, true, true)
    }

    /// Whether a device acknowledges `address`.
    pub fn address_responds(&mut self, address: u8) -> Result<bool> {
        self.start(address, I2cDirection::Write)
    }

    /// Probes all 128 addresses and returns those that acknowledge.
    pub fn search(&mut self) -> Result<Vec<u8>> {
        let mut found = Vec::new();
        for address in 0..i2c::ADDRESS_COUNT {
            if self.address_responds(address)? {
                found.push(address);
            }
        }
        debug!("I2C search found {:02X?}", found);
        Ok(found)
    }

    /// Sets the bit delay in microseconds. Slow slaves need a larger value.
    pub fn set_delay(&mut self, micros: u16) -> Result<()> {
        debug!("I2C delay = {}us", micros);
        self.wire
            .control_out(Function::I2cUpdateDelay, micros, 0)
    }
}
